use proptest::prelude::*;
use td_airfoil::{AirfoilFamily, CurveResolution, DoubleCircularArc, FirTree, SectionShape};

proptest! {
    #[test]
    fn every_section_outline_is_closed_and_finite(
        chord in 0.005_f64..0.2,
        thickness_to_chord in 0.03_f64..0.15,
        camber in -1.2_f64..1.2,
        stagger in -1.2_f64..1.2,
        arc_weight in 0.0_f64..=1.0,
    ) {
        let shape = SectionShape {
            chord,
            max_thickness: thickness_to_chord * chord,
            camber,
            stagger,
        };
        let family = DoubleCircularArc { arc_weight, ..DoubleCircularArc::default() };
        let profile = family.profile(0.5, &shape).unwrap();
        let curve = profile.curve(CurveResolution::default()).unwrap();

        prop_assert!(curve.len() >= 21);
        prop_assert_eq!(curve.first(), curve.last());
        prop_assert!(curve.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
        // the outline stays within a chord of the camber mid-point
        prop_assert!(curve.iter().all(|p| p.coords.norm() < chord));
    }

    #[test]
    fn arc_weight_outside_unit_interval_is_rejected(weight in 1.0001_f64..10.0) {
        let shape = SectionShape { chord: 0.05, max_thickness: 0.005, camber: 0.4, stagger: 0.0 };
        let family = DoubleCircularArc { arc_weight: weight, ..DoubleCircularArc::default() };
        prop_assert!(family.profile(0.0, &shape).is_err());
        let family = DoubleCircularArc { arc_weight: -weight, ..DoubleCircularArc::default() };
        prop_assert!(family.profile(0.0, &shape).is_err());
    }

    #[test]
    fn root_and_slot_outlines_are_closed(
        pitch in 0.004_f64..0.05,
        hub_radius in 0.03_f64..0.3,
        lobes in 1_usize..4,
        tolerance in 0.0_f64..1e-3,
        rim in any::<bool>(),
    ) {
        let root = FirTree {
            lobes,
            ..FirTree::for_pitch(pitch, 0.75 * pitch, rim.then_some(hub_radius), tolerance)
        };
        let attachment = root.attachment().unwrap();
        for outline in [attachment.outline(), attachment.slot()] {
            prop_assert_eq!(outline.first(), outline.last());
            prop_assert!(outline.iter().all(|p| p.y <= 0.0));
        }
        prop_assert!(attachment.height() > 0.0);
        prop_assert!(attachment.bottom_width() > 0.0);
        prop_assert_eq!(attachment.outline().len(), attachment.slot().len());
    }
}
