//! Built-in character sets a caller can pass instead of spelling out a
//! custom list of code points.

/// Every printable ASCII character except space.
pub const ASCII: &str =
    "!\"#$%&'()*+,-./0123456789:;<=>?@ABCDEFGHIJKLMNOPQRSTUVWXYZ[\\]^_`abcdefghijklmnopqrstuvwxyz{|}~";

/// A frozen snapshot set mixing Latin, Greek, Cyrillic, Japanese and
/// Chinese characters, including a few code points that are unrenderable
/// in a lot of fontfaces. Kept byte-for-byte stable across releases so
/// atlases built from it stay reproducible.
pub const PRESET_20180319: &[u32] = &[
    0x0001, 0x0003, 0x0007, 0x0011, 0x0020, 0x0021, 0x0023, 0x0024, 0x0025, 0x0026, 0x0027, 0x0028, 0x0029, 0x002a,
    0x002b, 0x002c, 0x002d, 0x002e, 0x002f, 0x0030, 0x0031, 0x0032, 0x0033, 0x0034, 0x0035, 0x0036, 0x0037, 0x0038,
    0x0039, 0x003a, 0x003b, 0x003c, 0x003d, 0x003e, 0x003f, 0x0040, 0x0041, 0x0042, 0x0043, 0x0044, 0x0045, 0x0046,
    0x0047, 0x0048, 0x0049, 0x004a, 0x004b, 0x004c, 0x004d, 0x004e, 0x004f, 0x0050, 0x0051, 0x0052, 0x0053, 0x0054,
    0x0055, 0x0056, 0x0057, 0x0058, 0x0059, 0x005a, 0x005b, 0x005c, 0x005d, 0x005e, 0x005f, 0x0060, 0x0061, 0x0062,
    0x0063, 0x0064, 0x0065, 0x0066, 0x0067, 0x0068, 0x0069, 0x006a, 0x006b, 0x006c, 0x006d, 0x006e, 0x006f, 0x0070,
    0x0071, 0x0072, 0x0073, 0x0074, 0x0075, 0x0076, 0x0077, 0x0078, 0x0079, 0x007a, 0x007b, 0x007d, 0x007e, 0x007f,
    0x0084, 0x009c, 0x00a4, 0x00b0, 0x00b6, 0x00bc, 0x00c3, 0x00c4, 0x00d3, 0x00d6, 0x00dc, 0x00df, 0x00e0, 0x00e1,
    0x00e4, 0x00f0, 0x00f3, 0x00f6, 0x00fc, 0x0178, 0x0394, 0x03ae, 0x03b1, 0x03b9, 0x03bc, 0x03bf, 0x03c1, 0x03c4,
    0x03c6, 0x03c9, 0x041a, 0x0430, 0x0433, 0x0438, 0x043d, 0x043e, 0x0440, 0x0442, 0x0443, 0x0444, 0x2013, 0x20ac,
    0x2192, 0x3001, 0x30a3, 0x30ae, 0x30b3, 0x30bf, 0x30d5, 0x30e5, 0x30ec, 0x30f3, 0x30fc, 0x4e09, 0x4e2a, 0x4e2d,
    0x4e3a, 0x4e3b, 0x4e49, 0x4e92, 0x4ea4, 0x4ea7, 0x4eba, 0x4ecb, 0x4ed6, 0x4ee3, 0x4ef6, 0x4fdd, 0x4fe1, 0x503a,
    0x505a, 0x516c, 0x5176, 0x5177, 0x51ed, 0x5230, 0x5238, 0x526f, 0x52a0, 0x5305, 0x5316, 0x5355, 0x5386, 0x539f,
    0x53d1, 0x53f0, 0x53f2, 0x54c1, 0x552e, 0x56e0, 0x573a, 0x578b, 0x5904, 0x5916, 0x5931, 0x5b57, 0x5b9a, 0x5b9e,
    0x5de5, 0x5df2, 0x5e02, 0x5e73, 0x5f00, 0x5f52, 0x5f55, 0x6027, 0x606f, 0x627f, 0x6295, 0x62bc, 0x62cd, 0x6362,
    0x636e, 0x63d0, 0x6444, 0x6536, 0x6570, 0x6587, 0x65b0, 0x65e5, 0x6613, 0x672c, 0x677f, 0x6784, 0x679c, 0x67e5,
    0x6848, 0x6863, 0x6b3e, 0x6bb5, 0x6d4b, 0x6d88, 0x6dfb, 0x6e20, 0x6e70, 0x6e90, 0x7406, 0x7528, 0x7533, 0x754c,
    0x767b, 0x7684, 0x76ee, 0x7801, 0x7968, 0x7a7a, 0x7acb, 0x7ed3, 0x80a1, 0x8272, 0x8425, 0x884c, 0x8868, 0x88fd,
    0x8907, 0x89c8, 0x89d2, 0x8bc1, 0x8bd5, 0x8be2, 0x8bf7, 0x8c03, 0x8d25, 0x8d26, 0x8d28, 0x8d37, 0x8d39, 0x8f6c,
    0x8f91, 0x903b, 0x9053, 0x9353, 0x94f6, 0x9500, 0x9636, 0x9644, 0x9762, 0x9875, 0x9879, 0x9884, 0xe21b, 0xff0d,
    0xff0f, 0xfffd,
];

/// Resolves a preset name (as accepted on the command line) to its code
/// points. Returns `None` for anything that isn't a recognised preset.
pub fn lookup(name: &str) -> Option<Vec<u32>> {
    match name {
        "ascii" => Some(ASCII.chars().map(|c| c as u32).collect()),
        "preset20180319" => Some(PRESET_20180319.to_vec()),
        _ => None,
    }
}
