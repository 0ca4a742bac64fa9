use thiserror::Error;

#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("descriptor is not valid UTF-8")]
    NotUtf8,
    #[error("malformed descriptor: first line '{0}' has fewer than 3 fields")]
    MissingFields(String),
    #[error("malformed descriptor: '{value}' is not a valid {field}")]
    InvalidDimension { field: &'static str, value: String },
}

/// Parsed form of an animation descriptor (`desc.txt`).
///
/// The first line declares `<width> <height> <frame-rate>`; only width and
/// height are interpreted. The frame-rate token and every subsequent line are
/// carried verbatim so that serialization reproduces the input byte-for-byte
/// when the dimensions are left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorRecord {
    pub width: u32,
    pub height: u32,
    /// Remainder of the first line after the two dimension fields, verbatim.
    pub frame_rate: String,
    /// Every line after the first, verbatim, without line terminators.
    pub body: Vec<String>,
}

impl DescriptorRecord {
    /// Serialize back to descriptor bytes, one trailing newline per line.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = format!("{} {} {}\n", self.width, self.height, self.frame_rate);
        for line in &self.body {
            out.push_str(line);
            out.push('\n');
        }
        out.into_bytes()
    }
}

/// Parse descriptor bytes into a [`DescriptorRecord`].
///
/// The first line must contain at least three space-separated fields; the
/// third field keeps any further spaces verbatim. Width and height must parse
/// as non-negative integers. Body lines, including empty ones, are preserved
/// in order.
pub fn parse_descriptor(bytes: &[u8]) -> Result<DescriptorRecord, DescriptorError> {
    let text = std::str::from_utf8(bytes).map_err(|_| DescriptorError::NotUtf8)?;

    let mut lines = text.split('\n');
    let first = lines.next().unwrap_or_default();

    let mut fields = first.splitn(3, ' ');
    let (Some(width_str), Some(height_str), Some(rate)) =
        (fields.next(), fields.next(), fields.next())
    else {
        return Err(DescriptorError::MissingFields(first.to_owned()));
    };

    let width = width_str
        .parse::<u32>()
        .map_err(|_| DescriptorError::InvalidDimension {
            field: "width",
            value: width_str.to_owned(),
        })?;
    let height = height_str
        .parse::<u32>()
        .map_err(|_| DescriptorError::InvalidDimension {
            field: "height",
            value: height_str.to_owned(),
        })?;

    let mut body: Vec<String> = lines.map(str::to_owned).collect();
    // A trailing newline on the input produces one empty trailing segment;
    // dropping it keeps the round trip byte-exact.
    if body.last().is_some_and(String::is_empty) {
        body.pop();
    }

    Ok(DescriptorRecord {
        width,
        height,
        frame_rate: rate.to_owned(),
        body,
    })
}
