//! Writes the BMFont-style `.fnt` descriptor that maps character codes to
//! rectangles within an atlas, plus kerning pairs.

use std::fmt::Write as _;
use std::path::Path;

use crate::error::Result;

#[derive(Clone, Debug)]
pub struct Info {
    pub face: String,
    pub size: i32,
    pub bold: bool,
    pub italic: bool,
    pub charset: String,
    pub unicode: bool,
}

#[derive(Clone, Debug)]
pub struct Common {
    pub line_height: i32,
    pub base: i32,
    pub scale_w: u32,
    pub scale_h: u32,
}

#[derive(Clone, Debug)]
pub struct CharInfo {
    pub id: u32,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub x_offset: f32,
    pub y_offset: f32,
    pub x_advance: f32,
}

#[derive(Clone, Debug)]
pub struct KerningInfo {
    pub first: u32,
    pub second: u32,
    pub amount: f32,
}

#[derive(Clone, Debug)]
pub struct Descriptor {
    pub info: Info,
    pub common: Common,
    pub page_file: String,
    pub chars: Vec<CharInfo>,
    pub kernings: Vec<KerningInfo>,
}

fn fmt_float(v: f32) -> String {
    // Default decimal notation, trimmed of a trailing ".0" the way
    // BMFont readers expect integral-looking metrics to appear.
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

impl Descriptor {
    pub fn render(&self) -> String {
        let mut out = String::new();
        writeln!(
            out,
            "info face=\"{}\" size={} bold={} italic={} charset=\"{}\" unicode={}",
            self.info.face,
            self.info.size,
            self.info.bold as u8,
            self.info.italic as u8,
            self.info.charset,
            self.info.unicode as u8,
        )
        .unwrap();
        writeln!(
            out,
            "common lineHeight={} base={} scaleW={} scaleH={} pages=1 packed=0",
            self.common.line_height, self.common.base, self.common.scale_w, self.common.scale_h,
        )
        .unwrap();
        writeln!(out, "page id=0 file=\"{}\"", self.page_file).unwrap();
        writeln!(out, "chars count={}", self.chars.len()).unwrap();
        for c in &self.chars {
            writeln!(
                out,
                "char id={} x={} y={} width={} height={} xoffset={} yoffset={} xadvance={} page=0 chnl=15",
                c.id,
                c.x,
                c.y,
                c.width,
                c.height,
                fmt_float(c.x_offset),
                fmt_float(c.y_offset),
                fmt_float(c.x_advance),
            )
            .unwrap();
        }
        writeln!(out, "kernings count={}", self.kernings.len()).unwrap();
        for k in &self.kernings {
            writeln!(out, "kerning first={} second={} amount={}", k.first, k.second, fmt_float(k.amount)).unwrap();
        }
        out
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.render())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Descriptor {
        Descriptor {
            info: Info {
                face: "Example Regular".to_string(),
                size: 32,
                bold: false,
                italic: false,
                charset: "".to_string(),
                unicode: true,
            },
            common: Common { line_height: 40, base: 32, scale_w: 256, scale_h: 256 },
            page_file: "atlas.png".to_string(),
            chars: vec![CharInfo {
                id: 65,
                x: 0,
                y: 0,
                width: 20,
                height: 24,
                x_offset: 1.5,
                y_offset: 2.0,
                x_advance: 22.0,
            }],
            kernings: vec![KerningInfo { first: 65, second: 86, amount: -1.5 }],
        }
    }

    #[test]
    fn renders_expected_line_shapes() {
        let text = sample().render();
        assert!(text.starts_with("info face=\"Example Regular\" size=32"));
        assert!(text.contains("common lineHeight=40 base=32 scaleW=256 scaleH=256 pages=1 packed=0"));
        assert!(text.contains("page id=0 file=\"atlas.png\""));
        assert!(text.contains("chars count=1"));
        assert!(text.contains("char id=65 x=0 y=0 width=20 height=24 xoffset=1.5 yoffset=2 xadvance=22"));
        assert!(text.contains("kernings count=1"));
        assert!(text.contains("kerning first=65 second=86 amount=-1.5"));
    }
}
