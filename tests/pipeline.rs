//! Exercises the library entry points `main` drives, end to end, using
//! synthetic glyph masks in place of real rasterised glyphs (no font
//! fixtures ship with this crate). Mirrors the CLI's own pipeline order:
//! rasterise (stand-in here) -> pack -> compose -> export -> decode.

use atlasgen::atlas::{compose_bitmap_atlas, compose_prepared_distance_field_atlas};
use atlasgen::descriptor::{CharInfo, Common, Descriptor, Info};
use atlasgen::distance_transform::{DeadReckoning, ParabolaEnvelope};
use atlasgen::downsample::Kernel;
use atlasgen::driver::run_and_downsample;
use atlasgen::geometry::Vec2;
use atlasgen::image::Image;
use atlasgen::packing::{pack_flexible, MaxRectsPacker, ShelfPacker};

fn square_mask(side: u32) -> Image {
    let mask = Image::new(side, side, 1);
    for y in 0..side {
        for x in 0..side {
            mask.set_pixel_bit(x, y, true);
        }
    }
    mask
}

#[test]
fn bitmap_atlas_round_trips_through_an_exported_png() {
    let glyphs = vec![square_mask(4), square_mask(6), square_mask(3)];
    let padding = 1;
    let sizes: Vec<Vec2<u32>> = glyphs
        .iter()
        .map(|g| g.size() + Vec2::new(padding * 2, padding * 2))
        .collect();
    let packing = pack_flexible::<ShelfPacker>(&sizes, false);
    assert_eq!(packing.rects.len(), glyphs.len());

    let atlas = compose_bitmap_atlas(&glyphs, &packing, padding, 8).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("atlas.png");
    atlas.export_u8(&path).unwrap();

    let decoded = Image::decode_png(&path, None).unwrap();
    assert_eq!(decoded.size(), atlas.size());
    // A pixel inside the first glyph's padded-in placement should have
    // come through as fully foreground (max value at 8-bit).
    let first = packing.rects[0];
    let cx = first.position.x + padding + 1;
    let cy = first.position.y + padding + 1;
    assert_eq!(decoded.get_pixel_u8(cx, cy), 255);
}

#[test]
fn maxrects_packing_places_every_glyph_without_overlap() {
    let sizes = vec![Vec2::new(5, 5), Vec2::new(10, 3), Vec2::new(3, 10), Vec2::new(8, 8)];
    let packing = pack_flexible::<MaxRectsPacker>(&sizes, false);
    assert_eq!(packing.rects.len(), sizes.len());
    for (i, a) in packing.rects.iter().enumerate() {
        assert!(a.max().x <= packing.atlas_size.x);
        assert!(a.max().y <= packing.atlas_size.y);
        for b in &packing.rects[i + 1..] {
            let disjoint = a.max().x <= b.position.x
                || b.max().x <= a.position.x
                || a.max().y <= b.position.y
                || b.max().y <= a.position.y;
            assert!(disjoint, "rects {a:?} and {b:?} overlap");
        }
    }
}

#[test]
fn distance_field_pipeline_downsamples_and_packs_precomputed_fields() {
    let mask = square_mask(8);
    let ratio = 2;
    let field_a = run_and_downsample(&DeadReckoning, &mask, ratio, Kernel::Min);
    let field_b = run_and_downsample(&ParabolaEnvelope, &square_mask(4), ratio, Kernel::Average);
    assert_eq!(field_a.size(), Vec2::new(4, 4));

    let sizes = vec![field_a.size(), field_b.size()];
    let packing = pack_flexible::<ShelfPacker>(&sizes, false);
    let atlas = compose_prepared_distance_field_atlas(&[field_a, field_b], &packing).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("field.png");
    atlas.export_distance_field_u16(&path, -4.0, 4.0).unwrap();

    let decoded = Image::decode_png(&path, None).unwrap();
    assert_eq!(decoded.bit_depth(), 16);
    assert_eq!(decoded.size(), atlas.size());
}

#[test]
fn descriptor_written_for_packed_glyphs_round_trips_as_text() {
    let sizes = vec![Vec2::new(12, 16), Vec2::new(10, 16)];
    let packing = pack_flexible::<ShelfPacker>(&sizes, false);

    let descriptor = Descriptor {
        info: Info {
            face: "Test Sans Regular".to_string(),
            size: 32,
            bold: false,
            italic: false,
            charset: String::new(),
            unicode: true,
        },
        common: Common {
            line_height: 38,
            base: 30,
            scale_w: packing.atlas_size.x,
            scale_h: packing.atlas_size.y,
        },
        page_file: "atlas.png".to_string(),
        chars: packing
            .rects
            .iter()
            .enumerate()
            .map(|(i, r)| CharInfo {
                id: b'A' as u32 + i as u32,
                x: r.position.x,
                y: r.position.y,
                width: r.size.x,
                height: r.size.y,
                x_offset: 0.0,
                y_offset: 0.0,
                x_advance: r.size.x as f32 + 1.0,
            })
            .collect(),
        kernings: Vec::new(),
    };

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("atlas.fnt");
    descriptor.write(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("chars count=2"));
    assert!(text.contains("kernings count=0"));
    assert!(text.contains(&format!("scaleW={}", packing.atlas_size.x)));
}
