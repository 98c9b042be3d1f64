//! CCITT Group 3/4 fax decoder.
//!
//! ITU-T Recommendation T.4 (Group 3) and T.6 (Group 4). The `K` parameter
//! selects the coding scheme: negative is pure two-dimensional (Group 4),
//! zero is one-dimensional Group 3, positive is mixed (a tag bit after each
//! EOL picks the coding of that row).
//!
//! Output is packed 1-bit-per-pixel scanlines, `ceil(Columns / 8)` bytes
//! per row. Internally white pixels are 1; with `BlackIs1` set the packed
//! rows are bit-inverted before returning.

use once_cell::sync::Lazy;

use crate::buffer::ByteCursor;
use crate::error::{PdfError, Result};

/// CCITT decoding parameters.
#[derive(Debug, Clone)]
pub struct CcittParams {
    /// Coding scheme: < 0 Group 4, 0 Group 3 1-D, > 0 mixed.
    pub k: i64,
    /// Pixels per scanline.
    pub columns: usize,
    /// Scanline count; 0 means decode until the data ends.
    pub rows: usize,
    /// Each row starts on a byte boundary.
    pub encoded_byte_align: bool,
    /// 1 bits are black in the output (default polarity is white = 1).
    pub black_is_1: bool,
}

impl Default for CcittParams {
    fn default() -> Self {
        Self {
            k: 0,
            columns: 1728,
            rows: 0,
            encoded_byte_align: false,
            black_is_1: false,
        }
    }
}

// === Huffman code tables (T.4 section 4) ===

#[derive(Clone, Debug, PartialEq)]
enum Mode {
    Vertical(i32),
    Horizontal,
    Pass,
    Uncompressed,
    Extension,
    Eofb,
}

#[derive(Clone, Debug)]
enum HuffValue {
    /// Run length (terminal < 64, make-up codes are multiples of 64).
    Run(u32),
    Mode(Mode),
    /// Literal pixel bits for uncompressed mode; a leading `T` marks a
    /// terminating code whose next char is the new color.
    Bits(&'static str),
}

enum HuffNode {
    Branch(Box<HuffNode>, Box<HuffNode>),
    Leaf(HuffValue),
    Empty,
}

impl HuffNode {
    fn insert(&mut self, bits: &str, value: HuffValue) {
        if bits.is_empty() {
            *self = Self::Leaf(value);
            return;
        }
        if !matches!(self, Self::Branch(..)) {
            *self = Self::Branch(Box::new(Self::Empty), Box::new(Self::Empty));
        }
        if let Self::Branch(left, right) = self {
            let (first, rest) = bits.split_at(1);
            if first == "1" {
                right.insert(rest, value);
            } else {
                left.insert(rest, value);
            }
        }
    }
}

const MODE_CODES: &[(&str, Mode)] = &[
    ("1", Mode::Vertical(0)),
    ("011", Mode::Vertical(1)),
    ("010", Mode::Vertical(-1)),
    ("001", Mode::Horizontal),
    ("0001", Mode::Pass),
    ("000011", Mode::Vertical(2)),
    ("000010", Mode::Vertical(-2)),
    ("0000011", Mode::Vertical(3)),
    ("0000010", Mode::Vertical(-3)),
    ("0000001111", Mode::Uncompressed),
    ("0000001000", Mode::Extension),
    ("0000001001", Mode::Extension),
    ("0000001010", Mode::Extension),
    ("0000001011", Mode::Extension),
    ("0000001100", Mode::Extension),
    ("0000001101", Mode::Extension),
    ("0000001110", Mode::Extension),
    ("000000000001000000000001", Mode::Eofb),
];

const WHITE_CODES: &[(u32, &str)] = &[
    (0, "00110101"),
    (1, "000111"),
    (2, "0111"),
    (3, "1000"),
    (4, "1011"),
    (5, "1100"),
    (6, "1110"),
    (7, "1111"),
    (8, "10011"),
    (9, "10100"),
    (10, "00111"),
    (11, "01000"),
    (12, "001000"),
    (13, "000011"),
    (14, "110100"),
    (15, "110101"),
    (16, "101010"),
    (17, "101011"),
    (18, "0100111"),
    (19, "0001100"),
    (20, "0001000"),
    (21, "0010111"),
    (22, "0000011"),
    (23, "0000100"),
    (24, "0101000"),
    (25, "0101011"),
    (26, "0010011"),
    (27, "0100100"),
    (28, "0011000"),
    (29, "00000010"),
    (30, "00000011"),
    (31, "00011010"),
    (32, "00011011"),
    (33, "00010010"),
    (34, "00010011"),
    (35, "00010100"),
    (36, "00010101"),
    (37, "00010110"),
    (38, "00010111"),
    (39, "00101000"),
    (40, "00101001"),
    (41, "00101010"),
    (42, "00101011"),
    (43, "00101100"),
    (44, "00101101"),
    (45, "00000100"),
    (46, "00000101"),
    (47, "00001010"),
    (48, "00001011"),
    (49, "01010010"),
    (50, "01010011"),
    (51, "01010100"),
    (52, "01010101"),
    (53, "00100100"),
    (54, "00100101"),
    (55, "01011000"),
    (56, "01011001"),
    (57, "01011010"),
    (58, "01011011"),
    (59, "01001010"),
    (60, "01001011"),
    (61, "00110010"),
    (62, "00110011"),
    (63, "00110100"),
    // Make-up codes
    (64, "11011"),
    (128, "10010"),
    (192, "010111"),
    (256, "0110111"),
    (320, "00110110"),
    (384, "00110111"),
    (448, "01100100"),
    (512, "01100101"),
    (576, "01101000"),
    (640, "01100111"),
    (704, "011001100"),
    (768, "011001101"),
    (832, "011010010"),
    (896, "011010011"),
    (960, "011010100"),
    (1024, "011010101"),
    (1088, "011010110"),
    (1152, "011010111"),
    (1216, "011011000"),
    (1280, "011011001"),
    (1344, "011011010"),
    (1408, "011011011"),
    (1472, "010011000"),
    (1536, "010011001"),
    (1600, "010011010"),
    (1664, "011000"),
    (1728, "010011011"),
];

const BLACK_CODES: &[(u32, &str)] = &[
    (0, "0000110111"),
    (1, "010"),
    (2, "11"),
    (3, "10"),
    (4, "011"),
    (5, "0011"),
    (6, "0010"),
    (7, "00011"),
    (8, "000101"),
    (9, "000100"),
    (10, "0000100"),
    (11, "0000101"),
    (12, "0000111"),
    (13, "00000100"),
    (14, "00000111"),
    (15, "000011000"),
    (16, "0000010111"),
    (17, "0000011000"),
    (18, "0000001000"),
    (19, "00001100111"),
    (20, "00001101000"),
    (21, "00001101100"),
    (22, "00000110111"),
    (23, "00000101000"),
    (24, "00000010111"),
    (25, "00000011000"),
    (26, "000011001010"),
    (27, "000011001011"),
    (28, "000011001100"),
    (29, "000011001101"),
    (30, "000001101000"),
    (31, "000001101001"),
    (32, "000001101010"),
    (33, "000001101011"),
    (34, "000011010010"),
    (35, "000011010011"),
    (36, "000011010100"),
    (37, "000011010101"),
    (38, "000011010110"),
    (39, "000011010111"),
    (40, "000001101100"),
    (41, "000001101101"),
    (42, "000011011010"),
    (43, "000011011011"),
    (44, "000001010100"),
    (45, "000001010101"),
    (46, "000001010110"),
    (47, "000001010111"),
    (48, "000001100100"),
    (49, "000001100101"),
    (50, "000001010010"),
    (51, "000001010011"),
    (52, "000000100100"),
    (53, "000000110111"),
    (54, "000000111000"),
    (55, "000000100111"),
    (56, "000000101000"),
    (57, "000001011000"),
    (58, "000001011001"),
    (59, "000000101011"),
    (60, "000000101100"),
    (61, "000001011010"),
    (62, "000001100110"),
    (63, "000001100111"),
    // Make-up codes
    (64, "0000001111"),
    (128, "000011001000"),
    (192, "000011001001"),
    (256, "000001011011"),
    (320, "000000110011"),
    (384, "000000110100"),
    (448, "000000110101"),
    (512, "0000001101100"),
    (576, "0000001101101"),
    (640, "0000001001010"),
    (704, "0000001001011"),
    (768, "0000001001100"),
    (832, "0000001001101"),
    (896, "0000001110010"),
    (960, "0000001110011"),
    (1024, "0000001110100"),
    (1088, "0000001110101"),
    (1152, "0000001110110"),
    (1216, "0000001110111"),
    (1280, "0000001010010"),
    (1344, "0000001010011"),
    (1408, "0000001010100"),
    (1472, "0000001010101"),
    (1536, "0000001011010"),
    (1600, "0000001011011"),
    (1664, "0000001100100"),
    (1728, "0000001100101"),
];

// Extended make-up codes, shared between white and black runs.
const EXT_CODES: &[(u32, &str)] = &[
    (1792, "00000001000"),
    (1856, "00000001100"),
    (1920, "00000001101"),
    (1984, "000000010010"),
    (2048, "000000010011"),
    (2112, "000000010100"),
    (2176, "000000010101"),
    (2240, "000000010110"),
    (2304, "000000010111"),
    (2368, "000000011100"),
    (2432, "000000011101"),
    (2496, "000000011110"),
    (2560, "000000011111"),
];

const UNCOMPRESSED_CODES: &[(&str, &str)] = &[
    ("1", "1"),
    ("01", "01"),
    ("001", "001"),
    ("0001", "0001"),
    ("00001", "00001"),
    ("000001", "00000"),
    ("00000011", "T00"),
    ("00000010", "T10"),
    ("000000011", "T000"),
    ("000000010", "T100"),
    ("0000000011", "T0000"),
    ("0000000010", "T1000"),
    ("00000000011", "T00000"),
    ("00000000010", "T10000"),
];

fn build_run_tree(codes: &[(u32, &'static str)]) -> HuffNode {
    let mut root = HuffNode::Empty;
    for &(run, bits) in codes.iter().chain(EXT_CODES) {
        root.insert(bits, HuffValue::Run(run));
    }
    root
}

// Built once, shared by all decodes.
static MODE_TREE: Lazy<HuffNode> = Lazy::new(|| {
    let mut root = HuffNode::Empty;
    for (bits, mode) in MODE_CODES {
        root.insert(bits, HuffValue::Mode(mode.clone()));
    }
    root
});
static WHITE_TREE: Lazy<HuffNode> = Lazy::new(|| build_run_tree(WHITE_CODES));
static BLACK_TREE: Lazy<HuffNode> = Lazy::new(|| build_run_tree(BLACK_CODES));
static UNCOMPRESSED_TREE: Lazy<HuffNode> = Lazy::new(|| {
    let mut root = HuffNode::Empty;
    for &(bits, value) in UNCOMPRESSED_CODES {
        root.insert(bits, HuffValue::Bits(value));
    }
    root
});

// === Bit-level input ===

struct BitReader<'a> {
    data: &'a [u8],
    pos: usize, // in bits
}

impl<'a> BitReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn read_bit(&mut self) -> Option<bool> {
        let byte = self.data.get(self.pos / 8)?;
        let bit = (byte >> (7 - self.pos % 8)) & 1;
        self.pos += 1;
        Some(bit != 0)
    }

    fn align_byte(&mut self) {
        self.pos = self.pos.div_ceil(8) * 8;
    }

    fn has_remaining(&self) -> bool {
        self.pos < self.data.len() * 8
    }
}

/// Walk a Huffman tree one bit at a time. `Ok(None)` means the input ran
/// out mid-code (end of data); an `Empty` node is a malformed code.
fn read_code<'t>(bits: &mut BitReader, tree: &'t HuffNode) -> Result<Option<&'t HuffValue>> {
    let start = bits.pos;
    let mut node = tree;
    loop {
        let bit = match bits.read_bit() {
            Some(b) => b,
            None => {
                bits.pos = start;
                return Ok(None);
            }
        };
        node = match node {
            HuffNode::Branch(left, right) => {
                if bit {
                    right.as_ref()
                } else {
                    left.as_ref()
                }
            }
            _ => return Err(PdfError::Parse("CCITTFax: invalid code".into())),
        };
        match node {
            HuffNode::Leaf(value) => return Ok(Some(value)),
            HuffNode::Empty => return Err(PdfError::Parse("CCITTFax: invalid code".into())),
            HuffNode::Branch(..) => {}
        }
    }
}

/// Read a complete run length: make-up codes (multiples of 64) accumulate
/// until a terminal code (< 64) closes the run.
fn read_run(bits: &mut BitReader, white: bool) -> Result<Option<u32>> {
    let tree: &HuffNode = if white { &WHITE_TREE } else { &BLACK_TREE };
    let mut total = 0u32;
    loop {
        match read_code(bits, tree)? {
            None => return Ok(None),
            Some(HuffValue::Run(n)) => {
                // Make-up codes are unbounded in a hostile stream; the
                // run is clamped rather than allowed to wrap.
                total = total.saturating_add(*n);
                if *n < 64 {
                    return Ok(Some(total));
                }
            }
            Some(_) => return Err(PdfError::Parse("CCITTFax: run code expected".into())),
        }
    }
}

/// Consume an EOL code (at least eleven 0 bits followed by a 1); restores
/// the position and reports false if the upcoming bits are not an EOL.
fn try_consume_eol(bits: &mut BitReader) -> bool {
    let start = bits.pos;
    let mut zeros = 0usize;
    loop {
        match bits.read_bit() {
            None => {
                bits.pos = start;
                return false;
            }
            Some(false) => {
                zeros += 1;
                if zeros > 64 {
                    bits.pos = start;
                    return false;
                }
            }
            Some(true) => {
                if zeros >= 11 {
                    return true;
                }
                bits.pos = start;
                return false;
            }
        }
    }
}

fn peek_eol(bits: &mut BitReader) -> bool {
    let start = bits.pos;
    let found = try_consume_eol(bits);
    bits.pos = start;
    found
}

// === Scanline reconstruction ===

/// Current and reference scanline state for one decode. Pixels are 1 for
/// white, 0 for black; `color` is the color of the run being built.
struct RowCoder {
    columns: usize,
    curline: Vec<u8>,
    refline: Vec<u8>,
    curpos: isize,
    color: u8,
}

impl RowCoder {
    fn new(columns: usize) -> Self {
        Self {
            columns,
            curline: vec![1; columns],
            refline: vec![1; columns],
            curpos: -1,
            color: 1,
        }
    }

    /// The just-decoded line becomes the reference line; the new current
    /// line starts all white with the position before the first pixel.
    fn start_row(&mut self) {
        std::mem::swap(&mut self.refline, &mut self.curline);
        self.curline.fill(1);
        self.curpos = -1;
        self.color = 1;
    }

    fn is_complete(&self) -> bool {
        self.curpos >= self.columns as isize
    }

    /// First changing element on the reference line right of the current
    /// position with the opposite color of the current run.
    fn find_b1(&self) -> usize {
        let mut x1 = (self.curpos + 1) as usize;
        loop {
            if x1 == 0 {
                if self.color == 1 && self.refline[x1] != self.color {
                    break;
                }
            } else if x1 >= self.refline.len()
                || (self.refline[x1 - 1] == self.color && self.refline[x1] != self.color)
            {
                break;
            }
            x1 += 1;
        }
        x1
    }

    fn do_vertical(&mut self, dx: i32) {
        let b1 = self.find_b1();
        let a1 = ((b1 as i32 + dx).max(0) as usize).min(self.columns);

        let x0 = self.curpos.max(0) as usize;
        if a1 < x0 {
            for x in a1..x0 {
                self.curline[x] = self.color;
            }
        } else {
            for x in x0..a1 {
                self.curline[x] = self.color;
            }
        }

        self.curpos = a1 as isize;
        self.color = 1 - self.color;
    }

    fn do_pass(&mut self) {
        let mut x1 = self.find_b1();

        // b2: next changing element after b1
        loop {
            if x1 == 0 {
                if self.color == 0 && self.refline[x1] == self.color {
                    break;
                }
            } else if x1 >= self.refline.len()
                || (self.refline[x1 - 1] != self.color && self.refline[x1] == self.color)
            {
                break;
            }
            x1 += 1;
        }

        let start = self.curpos.max(0) as usize;
        for x in start..x1.min(self.curline.len()) {
            self.curline[x] = self.color;
        }
        self.curpos = x1 as isize;
    }

    fn do_horizontal(&mut self, n1: usize, n2: usize) {
        if self.curpos < 0 {
            self.curpos = 0;
        }
        let mut x = self.curpos as usize;

        for _ in 0..n1 {
            if x >= self.curline.len() {
                break;
            }
            self.curline[x] = self.color;
            x += 1;
        }
        for _ in 0..n2 {
            if x >= self.curline.len() {
                break;
            }
            self.curline[x] = 1 - self.color;
            x += 1;
        }

        self.curpos = x as isize;
    }

    /// Fill one run for 1-D coding and flip the run color.
    fn fill_run(&mut self, run: usize) {
        if self.curpos < 0 {
            self.curpos = 0;
        }
        let start = self.curpos as usize;
        let end = (start + run).min(self.columns);
        for x in start..end {
            self.curline[x] = self.color;
        }
        self.curpos = (start + run).min(self.columns) as isize;
        self.color = 1 - self.color;
    }

    /// Literal pixels from uncompressed mode.
    fn apply_bits(&mut self, pixels: &str) {
        if self.curpos < 0 {
            self.curpos = 0;
        }
        for c in pixels.bytes() {
            if (self.curpos as usize) < self.columns {
                self.curline[self.curpos as usize] = c - b'0';
                self.curpos += 1;
            }
        }
    }
}

enum RowOutcome {
    Complete,
    EndOfData,
}

fn decode_row_2d(bits: &mut BitReader, coder: &mut RowCoder) -> Result<RowOutcome> {
    loop {
        let value = match read_code(bits, &MODE_TREE)? {
            Some(v) => v,
            None => return Ok(RowOutcome::EndOfData),
        };
        match value {
            HuffValue::Mode(Mode::Vertical(dx)) => coder.do_vertical(*dx),
            HuffValue::Mode(Mode::Pass) => coder.do_pass(),
            HuffValue::Mode(Mode::Horizontal) => {
                let n1 = match read_run(bits, coder.color == 1)? {
                    Some(n) => n,
                    None => return Ok(RowOutcome::EndOfData),
                };
                let n2 = match read_run(bits, coder.color != 1)? {
                    Some(n) => n,
                    None => return Ok(RowOutcome::EndOfData),
                };
                coder.do_horizontal(n1 as usize, n2 as usize);
            }
            HuffValue::Mode(Mode::Uncompressed) => {
                if decode_uncompressed(bits, coder)?.is_none() {
                    return Ok(RowOutcome::EndOfData);
                }
            }
            HuffValue::Mode(Mode::Eofb) => return Ok(RowOutcome::EndOfData),
            HuffValue::Mode(Mode::Extension) => {
                return Err(PdfError::Parse(
                    "CCITTFax: extension mode codes not supported".into(),
                ));
            }
            _ => return Err(PdfError::Parse("CCITTFax: mode code expected".into())),
        }
        if coder.is_complete() {
            return Ok(RowOutcome::Complete);
        }
    }
}

fn decode_uncompressed(bits: &mut BitReader, coder: &mut RowCoder) -> Result<Option<()>> {
    loop {
        match read_code(bits, &UNCOMPRESSED_TREE)? {
            None => return Ok(None),
            Some(HuffValue::Bits(s)) => {
                if let Some(rest) = s.strip_prefix('T') {
                    // Terminating code: first char is the color to resume with.
                    coder.color = rest.as_bytes()[0] - b'0';
                    coder.apply_bits(&rest[1..]);
                    return Ok(Some(()));
                }
                coder.apply_bits(s);
            }
            Some(_) => {
                return Err(PdfError::Parse(
                    "CCITTFax: uncompressed code expected".into(),
                ));
            }
        }
    }
}

fn decode_row_1d(bits: &mut BitReader, coder: &mut RowCoder) -> Result<RowOutcome> {
    if coder.curpos < 0 {
        coder.curpos = 0;
    }
    while !coder.is_complete() {
        // A premature EOL ends the row; the remainder stays white.
        if peek_eol(bits) {
            return Ok(RowOutcome::Complete);
        }
        let run = match read_run(bits, coder.color == 1)? {
            Some(r) => r,
            None => return Ok(RowOutcome::EndOfData),
        };
        coder.fill_run(run as usize);
    }
    Ok(RowOutcome::Complete)
}

fn pack_row(line: &[u8], invert: bool, out: &mut Vec<u8>) {
    let mut arr = vec![0u8; line.len().div_ceil(8)];
    for (i, &px) in line.iter().enumerate() {
        let bit = if invert { 1 - px } else { px };
        if bit != 0 {
            arr[i / 8] |= 0x80 >> (i % 8);
        }
    }
    out.extend_from_slice(&arr);
}

/// Decode CCITT fax data into packed 1-bpp scanlines.
///
/// Rows and Columns are attacker-controllable; callers wanting bounded
/// decode time enforce it externally.
pub fn ccittfaxdecode(input: &mut ByteCursor, params: &CcittParams) -> Result<Vec<u8>> {
    let columns = params.columns.max(1);
    let mut bits = BitReader::new(input.remaining_slice());
    let mut coder = RowCoder::new(columns);
    let mut out = Vec::new();
    let mut rows_done = 0usize;

    loop {
        if params.rows > 0 && rows_done >= params.rows {
            break;
        }
        if params.encoded_byte_align {
            bits.align_byte();
        }
        if !bits.has_remaining() {
            break;
        }

        let two_dim = if params.k < 0 {
            true
        } else {
            let mut eols = 0usize;
            while try_consume_eol(&mut bits) {
                eols += 1;
                if params.k > 0 {
                    // Mixed mode: a tag bit follows each EOL.
                    break;
                }
                if eols >= 6 {
                    // Return-to-control: end of data.
                    return Ok(out);
                }
            }
            if params.k > 0 && eols > 0 {
                match bits.read_bit() {
                    // Tag bit 1 selects 1-D coding, 0 selects 2-D.
                    Some(tag) => {
                        if peek_eol(&mut bits) {
                            // EOL right after the tag: no row data left.
                            return Ok(out);
                        }
                        !tag
                    }
                    None => break,
                }
            } else {
                false
            }
        };

        coder.start_row();
        let outcome = if two_dim {
            decode_row_2d(&mut bits, &mut coder)?
        } else {
            decode_row_1d(&mut bits, &mut coder)?
        };
        match outcome {
            RowOutcome::Complete => {
                pack_row(&coder.curline, params.black_is_1, &mut out);
                rows_done += 1;
            }
            // Partially decoded rows are dropped.
            RowOutcome::EndOfData => break,
        }
    }

    Ok(out)
}
