use rand::{Rng, SeedableRng};
use rect_packer_core::error::RectPackError;
use rect_packer_core::prelude::*;

fn disjoint(rects: &[Rect]) -> bool {
    for i in 0..rects.len() {
        for j in (i + 1)..rects.len() {
            if rects[i].overlaps(&rects[j]) {
                return false;
            }
        }
    }
    true
}

fn random_items(seed: u64, n: usize) -> Vec<Item> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| Item::new(rng.gen_range(1..=120), rng.gen_range(1..=120)))
        .collect()
}

/// Sizes taken from a real sprite sheet.
fn sprite_sheet() -> Vec<Item> {
    [
        (128, 317),
        (61, 61),
        (350, 284),
        (113, 70),
        (38, 38),
        (122, 122),
        (105, 68),
        (117, 115),
        (62, 59),
        (604, 314),
        (3, 3),
        (3, 3),
        (85, 94),
        (85, 94),
        (41, 65),
        (56, 82),
        (56, 82),
        (80, 66),
        (56, 63),
        (54, 57),
        (12, 4),
        (3, 59),
        (92, 46),
        (141, 46),
        (188, 46),
        (91, 46),
        (188, 46),
        (97, 47),
        (143, 48),
    ]
    .into_iter()
    .map(|(w, h)| Item::new(w, h))
    .collect()
}

fn check_layout<T: PackItem>(items: &[T], layout: &Layout<T>) {
    assert_eq!(layout.placements.len(), items.len());
    let rects: Vec<Rect> = layout.placements.iter().map(|p| p.rect()).collect();
    assert!(disjoint(&rects), "placements overlap");
    for (p, item) in layout.placements.iter().zip(items) {
        let (w, h) = item.size();
        if p.rotated {
            assert_eq!((p.w, p.h), (h, w));
        } else {
            assert_eq!((p.w, p.h), (w, h));
        }
        assert!(p.x + p.w <= layout.info.bin_width);
        assert!(p.y + p.h <= layout.info.bin_height);
        assert!(p.x + p.w <= layout.info.width);
        assert!(p.y + p.h <= layout.info.height);
    }
    let stats = layout.info.stats;
    assert_eq!(stats.num_items, items.len());
    assert!(stats.occupancy > 0.0 && stats.occupancy <= 1.0);
}

#[test]
fn single_item_is_placed_at_origin() {
    let items = vec![Item::new(100, 100)];
    let placed = rectangle_packer(&items).expect("packs");
    assert_eq!(placed.len(), 1);
    assert_eq!(placed[0].rect(), Rect::new(0, 0, 100, 100));
    assert!(!placed[0].rotated);
}

#[test]
fn zero_dimension_is_a_validation_error() {
    let items = vec![Item::new(0, 50), Item::new(100, 0)];
    match rectangle_packer(&items) {
        Err(RectPackError::Validation {
            index,
            width,
            height,
        }) => {
            assert_eq!((index, width, height), (0, 0, 50));
        }
        other => panic!("expected Validation error, got {other:?}"),
    }

    let mut items = vec![Item::new(10, 10), Item::new(100, 0)];
    let err = rectangle_packer_mut(&mut items).expect_err("must fail");
    assert!(err.to_string().contains("positive width and height"));
    assert!(items.iter().all(|it| it.x.is_none() && it.y.is_none()));
}

#[test]
fn empty_input_is_not_an_error() {
    let items: Vec<Item> = Vec::new();
    assert!(rectangle_packer(&items).expect("empty ok").is_empty());

    let mut items: Vec<Item> = Vec::new();
    assert!(rectangle_packer_mut(&mut items).expect("empty ok").is_empty());

    let layout = pack_layout::<Item>(&[], &PackerConfig::default()).expect("empty ok");
    assert_eq!((layout.info.width, layout.info.height), (0, 0));
    assert_eq!(layout.info.stats.occupancy, 0.0);
}

#[test]
fn pure_form_leaves_inputs_untouched() {
    let items = sprite_sheet();
    let before = items.clone();
    let layout = pack_layout(&items, &PackerConfig::default()).expect("packs");
    assert_eq!(items, before);
    assert!(items.iter().all(|it| it.x.is_none()));
    check_layout(&items, &layout);
    for (p, it) in layout.placements.iter().zip(&items) {
        assert_eq!(&p.item, it);
    }
}

#[test]
fn mutating_form_keeps_order_and_identity() {
    let mut items = sprite_sheet();
    let sizes: Vec<(u32, u32)> = items.iter().map(|it| (it.width, it.height)).collect();
    let ptr = items.as_ptr();
    let out = rectangle_packer_mut(&mut items).expect("packs");
    assert_eq!(out.as_ptr(), ptr);
    assert_eq!(out.len(), sizes.len());
    for (it, &(w, h)) in out.iter().zip(&sizes) {
        assert_eq!((it.width, it.height), (w, h));
        assert!(it.x.is_some() && it.y.is_some());
        assert!(!it.rotated);
    }
    let rects: Vec<Rect> = items
        .iter()
        .map(|it| Rect::new(it.x.unwrap_or(0), it.y.unwrap_or(0), it.width, it.height))
        .collect();
    assert!(disjoint(&rects));
}

#[test]
fn pure_and_mutating_forms_agree() {
    let items = random_items(9, 60);
    let cfg = PackerConfig::default();
    let layout = pack_layout(&items, &cfg).expect("packs");
    let mut in_place = items.clone();
    let info = pack_in_place(&mut in_place, &cfg).expect("packs");
    assert_eq!((info.width, info.height), (layout.info.width, layout.info.height));
    for (p, it) in layout.placements.iter().zip(&in_place) {
        assert_eq!(Some(p.x), it.x);
        assert_eq!(Some(p.y), it.y);
    }
}

#[test]
fn oversized_item_grows_the_bin() {
    let mut items = random_items(1, 30);
    items.push(Item::new(5000, 5000));
    let layout = pack_layout(&items, &PackerConfig::default()).expect("packs");
    check_layout(&items, &layout);
    assert!(layout.info.bin_width >= 5000 && layout.info.bin_height >= 5000);
}

#[test]
fn growth_retries_until_everything_fits() {
    // The initial guess (an 18x18 square) only holds one of these.
    let items = vec![Item::new(10, 10); 3];
    let layout = pack_layout(&items, &PackerConfig::default()).expect("packs");
    check_layout(&items, &layout);
    assert!(layout.info.attempts > 1);

    let cfg = PackerConfig::builder().max_attempts(1).build();
    match pack_layout(&items, &cfg) {
        Err(RectPackError::PackingFailed { attempts, .. }) => assert_eq!(attempts, 1),
        other => panic!("expected PackingFailed, got {other:?}"),
    }
}

#[test]
fn caps_that_cannot_hold_the_items_fail() {
    let cfg = PackerConfig::builder()
        .with_max_dimensions(100, 100)
        .build();
    let too_big = vec![Item::new(200, 10)];
    assert!(matches!(
        pack_layout(&too_big, &cfg),
        Err(RectPackError::PackingFailed { attempts: 0, .. })
    ));

    let too_many = vec![Item::new(60, 60); 5];
    assert!(matches!(
        pack_layout(&too_many, &cfg),
        Err(RectPackError::PackingFailed { .. })
    ));

    // rotation rescues a tall item under a short cap
    let rot = PackerConfig::builder()
        .with_max_dimensions(100, 20)
        .allow_rotation(true)
        .build();
    let tall = vec![Item::new(10, 90)];
    let layout = pack_layout(&tall, &rot).expect("rotated fit");
    assert!(layout.placements[0].rotated);
    assert_eq!(layout.placements[0].rect(), Rect::new(0, 0, 90, 10));
}

#[test]
fn every_family_and_sort_order_packs_the_sprite_sheet() {
    let items = sprite_sheet();
    let families = [
        AlgorithmFamily::Guillotine,
        AlgorithmFamily::MaxRects,
        AlgorithmFamily::Auto,
    ];
    let orders = [
        SortOrder::HeightDesc,
        SortOrder::AreaDesc,
        SortOrder::MaxSideDesc,
        SortOrder::WidthDesc,
        SortOrder::None,
    ];
    for family in families {
        for order in orders {
            for rotation in [false, true] {
                let cfg = PackerConfig::builder()
                    .family(family)
                    .sort_order(order)
                    .allow_rotation(rotation)
                    .build();
                let layout = pack_layout(&items, &cfg).expect("packs");
                check_layout(&items, &layout);
                assert_ne!(layout.info.family, AlgorithmFamily::Auto);
            }
        }
    }
}

#[test]
fn auto_is_never_worse_than_default_guillotine() {
    let items = random_items(21, 80);
    let guillotine = pack_layout(&items, &PackerConfig::default()).expect("packs");
    let auto = pack_layout(
        &items,
        &PackerConfig::builder()
            .family(AlgorithmFamily::Auto)
            .auto_mode(AutoMode::Quality)
            .build(),
    )
    .expect("packs");
    check_layout(&items, &auto);
    let area = |l: &Layout<Item>| l.info.width as u64 * l.info.height as u64;
    assert!(area(&auto) <= area(&guillotine));
}

#[test]
fn bounds_can_be_rounded() {
    let items = random_items(4, 25);
    let cfg = PackerConfig::builder().pow2(true).square(true).build();
    let layout = pack_layout(&items, &cfg).expect("packs");
    check_layout(&items, &layout);
    assert_eq!(layout.info.width, layout.info.height);
    assert!(layout.info.width.is_power_of_two());
}

#[test]
fn tuples_and_rects_are_items() {
    let sizes = vec![(30u32, 10u32), (10, 30), (20, 20)];
    let placed = rectangle_packer(&sizes).expect("packs");
    assert_eq!(placed.len(), 3);
    assert_eq!(placed[2].item, (20, 20));

    let mut rects = vec![Rect::new(0, 0, 30, 10), Rect::new(0, 0, 10, 30)];
    rectangle_packer_mut(&mut rects).expect("packs");
    assert!(disjoint(&rects));
}

#[test]
fn packing_is_deterministic() {
    let items = random_items(77, 100);
    let cfg = PackerConfig::builder()
        .family(AlgorithmFamily::MaxRects)
        .mr_heuristic(MaxRectsHeuristic::ContactPoint)
        .build();
    let a = pack_layout(&items, &cfg).expect("packs");
    let b = pack_layout(&items, &cfg).expect("packs");
    assert_eq!(a.placements, b.placements);
}

#[test]
fn huge_total_area_fails_instead_of_overflowing() {
    let items = vec![(u32::MAX, u32::MAX), (u32::MAX, u32::MAX)];
    match rectangle_packer(&items) {
        Err(RectPackError::PackingFailed {
            attempts,
            width,
            height,
        }) => {
            assert_eq!(attempts, 1);
            assert_eq!((width, height), (u32::MAX, u32::MAX));
        }
        other => panic!("expected PackingFailed, got {other:?}"),
    }

    let single = vec![(u32::MAX, u32::MAX)];
    let placed = rectangle_packer(&single).expect("one full-size item fits");
    assert_eq!(placed[0].rect(), Rect::new(0, 0, u32::MAX, u32::MAX));
}
