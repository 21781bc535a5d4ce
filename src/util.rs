use anyhow::bail;
use base64::DecodeError;
use base64::Engine as _;
use once_cell::sync::Lazy;

pub(crate) fn encode_base64_standard(input: impl AsRef<[u8]>) -> String {
    base64::engine::general_purpose::STANDARD.encode(input)
}

pub(crate) fn decode_base64_standard(input: impl AsRef<[u8]>) -> Result<Vec<u8>, DecodeError> {
    base64::engine::general_purpose::STANDARD.decode(input)
}

pub(crate) fn encode_base64_urlsafe_nopad(input: impl AsRef<[u8]>) -> String {
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(input)
}

pub(crate) fn decode_base64_urlsafe_no_pad(
    input: impl AsRef<[u8]>,
) -> Result<Vec<u8>, DecodeError> {
    base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(input)
}

/// Split a PEM document into its label and DER contents.
///
/// Return `None` when the input doesn't start with a PEM boundary line, so
/// the caller can treat it as DER. Documents with RFC 1421 headers are
/// rejected; legacy encrypted PEM is left to OpenSSL.
pub(crate) fn parse_pem(input: &[u8]) -> Option<anyhow::Result<(String, Vec<u8>)>> {
    static RE_BOUNDARY: Lazy<regex::Regex> =
        Lazy::new(|| regex::Regex::new(r"^-----(BEGIN|END) ([A-Z0-9 -]+)-----$").unwrap());

    let text = std::str::from_utf8(input).ok()?;
    let mut lines = text.lines().map(str::trim).filter(|line| !line.is_empty());

    let begin = RE_BOUNDARY.captures(lines.next()?)?;
    if &begin[1] != "BEGIN" {
        return None;
    }
    let label = begin[2].to_string();

    Some((move || -> anyhow::Result<(String, Vec<u8>)> {
        let mut body = String::new();
        loop {
            let line = match lines.next() {
                Some(val) => val,
                None => bail!("Missing the ending line of {}.", label),
            };
            match RE_BOUNDARY.captures(line) {
                Some(caps) if &caps[1] == "END" => {
                    if &caps[2] != label {
                        bail!("Mismatched the beginning and ending label.");
                    }
                    break;
                }
                Some(_) => bail!("Unexpected boundary line: {}", line),
                None if line.contains(':') => bail!("PEM headers are not supported."),
                None => body.push_str(line),
            }
        }

        if lines.next().is_some() {
            bail!("Unexpected data after the ending line.");
        }

        let contents = decode_base64_standard(&body)?;
        Ok((label, contents))
    })())
}
