use colletkit_core::*;

fn collet(size: &str, stock: u32) -> Collet {
    Collet {
        id: size.to_string(),
        name: format!("Pinça {}", size),
        size: size.to_string(),
        stock,
        ..Default::default()
    }
}

fn sweep(from: f64, to: f64) -> Vec<f64> {
    let mut values = Vec::new();
    let mut v = from;
    while v < to {
        values.push(v);
        v += 0.01;
    }
    values
}

#[test]
fn test_three_mm_neighbourhood_resolves_to_imperial_collet() {
    for mm in sweep(2.86, 3.14) {
        assert_eq!(
            resolve_millimeters(mm).target_size,
            Some(COLLET_3175_MM),
            "shank {}",
            mm
        );
    }
    for mm in [3.1651, 3.175, 3.1849] {
        assert_eq!(resolve_millimeters(mm).target_size, Some(COLLET_3175_MM));
    }
}

#[test]
fn test_five_and_six_mm_neighbourhoods_resolve_to_six_mm_collet() {
    for mm in sweep(4.86, 5.14).into_iter().chain(sweep(5.86, 6.14)) {
        assert_eq!(
            resolve_millimeters(mm).target_size,
            Some(COLLET_6_MM),
            "shank {}",
            mm
        );
    }
}

#[test]
fn test_band_edges_are_exclusive() {
    // 4.85 and 5.85 sit a hair over 0.15 away in binary floating point
    for mm in [4.85, 5.15, 5.85, 6.15] {
        let req = resolve_millimeters(mm);
        assert_eq!(req.target_size, None, "shank {}", mm);
        assert_eq!(req.label, UNAVAILABLE_LABEL);
    }
    for mm in [4.86, 5.14, 5.86, 6.14] {
        assert_eq!(resolve_millimeters(mm).target_size, Some(COLLET_6_MM), "shank {}", mm);
    }
    assert_eq!(resolve_collet(&ShankDiameter::from("4,85")).target_size, None);
    assert_eq!(resolve_collet(&ShankDiameter::from("5.85mm")).target_size, None);
}

#[test]
fn test_outside_bands_is_unavailable() {
    let inputs = [
        ShankDiameter::from(0.0),
        ShankDiameter::from(4.0),
        ShankDiameter::from(8.0),
        ShankDiameter::from("abc"),
        ShankDiameter::from(""),
    ];
    for shank in inputs {
        let req = resolve_collet(&shank);
        assert_eq!(req.target_size, None, "shank {}", shank);
        assert_eq!(req.label, UNAVAILABLE_LABEL);
        assert!(!is_compatible(&shank, &[collet("3.175", 9), collet("6", 9)]));
    }
}

#[test]
fn test_scenario_three_mm_shank() {
    let shank = ShankDiameter::from("3");
    let req = resolve_collet(&shank);
    assert_eq!(req.label, "Usar Pinça 3.175mm");
    assert_eq!(req.target_size, Some(3.175));

    assert!(!is_compatible(&shank, &[collet("3.175mm", 0)]));
    assert!(is_compatible(&shank, &[collet("3,175", 2)]));
}

#[test]
fn test_scenario_seven_mm_shank() {
    let shank = ShankDiameter::from("7");
    let req = resolve_collet(&shank);
    assert_eq!(req.label, "Pinça indisponível");
    assert_eq!(req.target_size, None);
    assert!(!is_compatible(&shank, &[]));
    assert!(!is_compatible(&shank, &[collet("7", 3), collet("6", 3)]));
}

#[test]
fn test_adding_inventory_never_removes_compatibility() {
    let shank = ShankDiameter::from("6mm");
    let base = vec![collet("6", 1)];
    assert!(is_compatible(&shank, &base));

    let extras = [collet("3.175", 0), collet("6", 0), collet("junk", 4), collet("12", 2)];
    for extra in extras {
        let mut grown = base.clone();
        grown.push(extra);
        assert!(is_compatible(&shank, &grown));
    }
}

#[test]
fn test_removing_sole_matching_collet_breaks_compatibility() {
    let shank = ShankDiameter::from(5.0);
    let mut collets = vec![collet("3.175", 4), collet("6", 1)];
    assert!(is_compatible(&shank, &collets));

    collets.retain(|c| c.size != "6");
    assert!(!is_compatible(&shank, &collets));
}
