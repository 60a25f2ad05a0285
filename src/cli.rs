//! `atlasgen`'s two subcommands (`atlas`, `distfield`), parsed with
//! `clap`'s derive API: one function per subcommand, each returning a
//! process exit code, dispatched through a top-level `#[derive(Subcommand)]`
//! enum.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use log::warn;

use crate::atlas;
use crate::descriptor::{CharInfo, Common, Descriptor, Info};
use crate::distance_transform::{DeadReckoning, DistanceTransform, ParabolaEnvelope};
use crate::downsample::Kernel;
use crate::driver;
use crate::error::{AtlasError, Result};
use crate::geometry::{Rect, Vec2};
use crate::image::Image;
use crate::packing::{pack_flexible, MaxRectsPacker, Packing, ShelfPacker};
use crate::presets;
use crate::raster::{looks_like_font_file, rasterize_glyph, FontSource, RasterMetrics};

#[derive(Parser)]
#[command(name = "atlasgen", about = "Generates signed-distance-field font atlases")]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rasterise a glyph set, optionally distance-transform it, and pack it into an atlas PNG.
    Atlas(AtlasArgs),
    /// Apply a distance transform to an existing 1-bit PNG.
    Distfield(DistfieldArgs),
}

#[derive(clap::Args)]
struct AtlasArgs {
    /// Output PNG path.
    outfile: PathBuf,

    /// Compute a signed distance field with the given algorithm instead of a raw bitmap.
    #[arg(short = 'd', long, value_name = "ALGO")]
    distfield: Option<String>,

    /// Rectangle packing algorithm.
    #[arg(short = 'k', long, default_value = "shelf")]
    packing: String,

    /// UTF-8 text; every code point becomes one glyph.
    #[arg(short = 'g', long)]
    glyph: Option<String>,

    /// Additional character codes, given as integers.
    #[arg(short = 'c', long, num_args = 1.., value_name = "CODE")]
    charcode: Vec<u32>,

    /// A predefined code-point set (`ascii` or `preset20180319`).
    #[arg(long)]
    preset: Option<String>,

    /// Font size in pixels.
    #[arg(short = 's', long, default_value_t = 128)]
    fontsize: u32,

    /// A font family name, resolved through the system's installed fonts.
    #[arg(short = 'f', long)]
    fontname: Option<String>,

    /// A font file on disk.
    #[arg(long)]
    fontpath: Option<PathBuf>,

    /// Padding (in pixels) around each glyph.
    #[arg(short = 'p', long, default_value_t = 0)]
    padding: u32,

    /// Integer ratio to rasterise at then shrink back down by, before packing.
    #[arg(short = 'w', long, default_value_t = 1)]
    downsampling: u32,

    /// Downsampling kernel.
    #[arg(long, default_value = "center")]
    dsalgo: String,

    /// Distance-field value range mapped onto the output pixel range. Requires `-d`.
    #[arg(short = 'r', long, num_args = 2, value_names = ["BLACK", "WHITE"], allow_negative_numbers = true, default_values_t = [-30.0, 20.0])]
    dynamicrange: Vec<f32>,

    /// Also write a `.fnt` descriptor next to the atlas.
    #[arg(long)]
    fnt: bool,
}

#[derive(clap::Args)]
struct DistfieldArgs {
    /// A 1-bit black/white PNG.
    image: PathBuf,

    /// Output PNG path.
    outfile: PathBuf,

    /// Distance transform algorithm.
    #[arg(short = 'a', long, default_value = "parabola")]
    algorithm: String,

    /// Distance-field value range mapped onto the output pixel range.
    #[arg(short = 'r', long, num_args = 2, value_names = ["BLACK", "WHITE"], allow_negative_numbers = true, default_values_t = [-30.0, 20.0])]
    dynamicrange: Vec<f32>,
}

/// Parses the process's arguments and runs the selected subcommand,
/// returning the process exit code (0 success, 2 per spec.md §6/§7).
pub fn run() -> i32 {
    let cli = Cli::parse();
    let result = match &cli.command {
        Command::Atlas(args) => run_atlas(args),
        Command::Distfield(args) => run_distfield(args),
    };
    match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {e}");
            2
        }
    }
}

#[derive(Clone, Copy)]
enum Algorithm {
    DeadReckoning,
    Parabola,
}

impl Algorithm {
    fn parse(name: &str) -> Option<Algorithm> {
        match name {
            "deadrec" => Some(Algorithm::DeadReckoning),
            "parabola" => Some(Algorithm::Parabola),
            _ => None,
        }
    }
}

impl DistanceTransform for Algorithm {
    fn transform(&self, input: &Image, output: &Image) {
        match self {
            Algorithm::DeadReckoning => DeadReckoning.transform(input, output),
            Algorithm::Parabola => ParabolaEnvelope.transform(input, output),
        }
    }
}

enum PackingAlgo {
    Shelf,
    MaxRects,
}

impl PackingAlgo {
    fn parse(name: &str) -> Option<PackingAlgo> {
        match name {
            "shelf" => Some(PackingAlgo::Shelf),
            "maxrects" => Some(PackingAlgo::MaxRects),
            _ => None,
        }
    }

    fn pack(&self, sizes: &[Vec2<u32>]) -> Packing {
        match self {
            PackingAlgo::Shelf => pack_flexible::<ShelfPacker>(sizes, false),
            PackingAlgo::MaxRects => pack_flexible::<MaxRectsPacker>(sizes, false),
        }
    }
}

/// Unions `-g`'s code points, `-c`'s raw codes, and a resolved `--preset`
/// into one sorted, de-duplicated glyph set. Errors if the result is
/// empty, per spec.md §7's argument-error kind.
fn build_glyph_set(glyph: Option<&str>, charcodes: &[u32], preset: Option<&str>) -> Result<Vec<u32>> {
    let mut set: BTreeSet<u32> = BTreeSet::new();
    if let Some(text) = glyph {
        set.extend(text.chars().map(|c| c as u32));
    }
    set.extend(charcodes.iter().copied());
    if let Some(name) = preset {
        let points = presets::lookup(name)
            .ok_or_else(|| AtlasError::Argument(format!("unknown preset {name:?}")))?;
        set.extend(points);
    }
    if set.is_empty() {
        return Err(AtlasError::Argument("at least one glyph required".to_string()));
    }
    Ok(set.into_iter().collect())
}

fn fnt_path_for(outfile: &Path) -> PathBuf {
    outfile.with_extension("fnt")
}

struct RasterisedGlyph {
    codepoint: u32,
    image: Image,
    metrics: RasterMetrics,
}

/// Rasterises every requested code point, recording glyphs the font has
/// no shape for (spec.md §7's glyph-missing kind) as non-fatal warnings
/// instead of propagating the error.
fn rasterize_all(
    font: &font_kit::loaders::default::Font,
    codepoints: &[u32],
    fontsize: f32,
    raster_padding: u32,
) -> (Vec<RasterisedGlyph>, Vec<u32>) {
    let mut glyphs = Vec::with_capacity(codepoints.len());
    let mut non_depictable = Vec::new();
    for &codepoint in codepoints {
        let ch = match char::from_u32(codepoint) {
            Some(c) => c,
            None => {
                warn!("code point U+{codepoint:04X} is not a valid Unicode scalar value, skipping");
                non_depictable.push(codepoint);
                continue;
            }
        };
        match rasterize_glyph(font, ch, fontsize, raster_padding) {
            Ok((image, metrics)) => glyphs.push(RasterisedGlyph { codepoint, image, metrics }),
            Err(AtlasError::GlyphMissing(cp)) => {
                warn!("font has no glyph for code point U+{cp:04X}, omitting");
                non_depictable.push(codepoint);
            }
            Err(e) => {
                warn!("skipping code point U+{codepoint:04X}: {e}");
                non_depictable.push(codepoint);
            }
        }
    }
    (glyphs, non_depictable)
}

fn run_atlas(args: &AtlasArgs) -> Result<()> {
    if args.fontname.is_some() == args.fontpath.is_some() {
        return Err(AtlasError::Argument(
            "exactly one of --fontname or --fontpath is required".to_string(),
        ));
    }
    let packing_algo = PackingAlgo::parse(&args.packing)
        .ok_or_else(|| AtlasError::Argument(format!("unknown packing algorithm {:?}", args.packing)))?;
    let distfield_algo = match &args.distfield {
        Some(name) => Some(
            Algorithm::parse(name)
                .ok_or_else(|| AtlasError::Argument(format!("unknown distfield algorithm {name:?}")))?,
        ),
        None => None,
    };
    if args.dynamicrange != [-30.0, 20.0] && distfield_algo.is_none() {
        return Err(AtlasError::Argument("--dynamicrange requires --distfield".to_string()));
    }
    if args.downsampling > 1 && distfield_algo.is_none() {
        return Err(AtlasError::Argument("--downsampling requires --distfield".to_string()));
    }
    let kernel = Kernel::parse(&args.dsalgo)
        .ok_or_else(|| AtlasError::Argument(format!("unknown downsampling kernel {:?}", args.dsalgo)))?;

    let codepoints = build_glyph_set(args.glyph.as_deref(), &args.charcode, args.preset.as_deref())?;

    let source = match (&args.fontname, &args.fontpath) {
        (Some(name), None) => FontSource::Name(name.clone()),
        (None, Some(path)) => {
            if !looks_like_font_file(path) {
                return Err(AtlasError::Argument(format!(
                    "--fontpath {path:?} doesn't look like a font file (expected .ttf/.otf/.ttc/.otc)"
                )));
            }
            FontSource::Path(path.clone())
        }
        _ => unreachable!("validated above"),
    };
    let font = source.load()?;

    let (black, white) = (args.dynamicrange[0], args.dynamicrange[1]);

    let (atlas_image, placements, atlas_size) = if let Some(algo) = distfield_algo {
        let raster_padding = args.padding * args.downsampling;
        let (glyphs, _non_depictable) =
            rasterize_all(&font, &codepoints, args.fontsize as f32, raster_padding);
        if glyphs.is_empty() {
            return Err(AtlasError::Argument("no requested glyph could be rasterised".to_string()));
        }
        let mut fields = Vec::with_capacity(glyphs.len());
        let mut placements = Vec::with_capacity(glyphs.len());
        for g in &glyphs {
            let field = driver::run_and_downsample(&algo, &g.image, args.downsampling, kernel);
            fields.push(field);
        }
        let sizes: Vec<Vec2<u32>> = fields.iter().map(Image::size).collect();
        let packing = packing_algo.pack(&sizes);
        let atlas_image = atlas::compose_prepared_distance_field_atlas(&fields, &packing)?;
        for (g, rect) in glyphs.iter().zip(&packing.rects) {
            placements.push((g.codepoint, *rect, scale_metrics(g.metrics, args.downsampling)));
        }
        (atlas_image, placements, packing.atlas_size)
    } else {
        let (glyphs, _non_depictable) = rasterize_all(&font, &codepoints, args.fontsize as f32, 0);
        if glyphs.is_empty() {
            return Err(AtlasError::Argument("no requested glyph could be rasterised".to_string()));
        }
        let images: Vec<Image> = glyphs.iter().map(|g| g.image.clone()).collect();
        let border = Vec2::new(args.padding * 2, args.padding * 2);
        let sizes: Vec<Vec2<u32>> = images.iter().map(|img| img.size() + border).collect();
        let packing = packing_algo.pack(&sizes);
        let atlas_image = atlas::compose_bitmap_atlas(&images, &packing, args.padding, 8)?;
        let placements = glyphs
            .iter()
            .zip(&packing.rects)
            .map(|(g, rect)| {
                let visible = Rect::new(
                    rect.position + Vec2::new(args.padding, args.padding),
                    g.image.size(),
                );
                (g.codepoint, visible, g.metrics)
            })
            .collect();
        (atlas_image, placements, packing.atlas_size)
    };

    if distfield_algo.is_some() {
        atlas_image.export_distance_field_u8(&args.outfile, black, white)?;
    } else {
        atlas_image.export_u8(&args.outfile)?;
    }

    if args.fnt {
        let page_file = args
            .outfile
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| args.outfile.to_string_lossy().into_owned());
        let descriptor = build_descriptor(&font, args.fontsize, atlas_size, &page_file, &placements);
        descriptor.write(fnt_path_for(&args.outfile))?;
    }

    Ok(())
}

fn scale_metrics(metrics: RasterMetrics, ratio: u32) -> RasterMetrics {
    if ratio <= 1 {
        return metrics;
    }
    let factor = 1.0 / ratio as f32;
    RasterMetrics {
        bearing_x: metrics.bearing_x * factor,
        bearing_y: metrics.bearing_y * factor,
        advance_x: metrics.advance_x * factor,
    }
}

fn build_descriptor(
    font: &font_kit::loaders::default::Font,
    fontsize: u32,
    atlas_size: Vec2<u32>,
    page_file: &str,
    placements: &[(u32, Rect<u32>, RasterMetrics)],
) -> Descriptor {
    let metrics = font.metrics();
    let upm = metrics.units_per_em.max(1) as f32;
    let scale = fontsize as f32 / upm;
    let properties = font.properties();
    let bold = properties.weight.0 >= font_kit::properties::Weight::BOLD.0;
    let italic = !matches!(properties.style, font_kit::properties::Style::Normal);

    let chars = placements
        .iter()
        .map(|(codepoint, rect, m)| CharInfo {
            id: *codepoint,
            x: rect.position.x,
            y: rect.position.y,
            width: rect.size.x,
            height: rect.size.y,
            x_offset: m.bearing_x,
            y_offset: m.bearing_y,
            x_advance: m.advance_x,
        })
        .collect();

    Descriptor {
        info: Info {
            face: font.full_name(),
            size: fontsize as i32,
            bold,
            italic,
            charset: String::new(),
            unicode: true,
        },
        common: Common {
            line_height: ((metrics.ascent - metrics.descent) * scale).round() as i32,
            base: (metrics.ascent * scale).round() as i32,
            scale_w: atlas_size.x,
            scale_h: atlas_size.y,
        },
        page_file: page_file.to_string(),
        chars,
        kernings: Vec::new(),
    }
}

fn run_distfield(args: &DistfieldArgs) -> Result<()> {
    let algo = Algorithm::parse(&args.algorithm)
        .ok_or_else(|| AtlasError::Argument(format!("unknown distfield algorithm {:?}", args.algorithm)))?;
    let input = Image::decode_png(&args.image, Some(1))?;
    let output = driver::run(&algo, &input);
    let (black, white) = (args.dynamicrange[0], args.dynamicrange[1]);
    output.export_distance_field_u8(&args.outfile, black, white)?;
    Ok(())
}
