//! Mime detection for source files and mime → image format mapping.
//!
//! Detection reads the first bytes of the file and checks known signatures,
//! then falls back to the file extension.

use image::ImageFormat;
use std::io::Read;
use std::path::Path;

/// Mime reported when nothing matches.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Bytes read for sniffing; room for an XML prolog and comment before `<svg`.
const HEADER_LEN: usize = 512;

/// Signatures shared by several formats.
const CONTAINERS: &[&str] = &["application/zip", "image/tiff"];

/// Formats the encoder stage writes.
const WRITABLE: &[ImageFormat] = &[
    ImageFormat::WebP,
    ImageFormat::Png,
    ImageFormat::Jpeg,
    ImageFormat::Gif,
    ImageFormat::Bmp,
    ImageFormat::Tiff,
    ImageFormat::Ico,
    ImageFormat::Avif,
    ImageFormat::Tga,
    ImageFormat::Qoi,
];

/// Extension table used when the header is not conclusive.
const EXTENSIONS: &[(&str, &str)] = &[
    // Raster images
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("bmp", "image/bmp"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("ico", "image/vnd.microsoft.icon"),
    ("avif", "image/avif"),
    ("heic", "image/heic"),
    ("heif", "image/heif"),
    ("tga", "image/x-tga"),
    ("qoi", "image/qoi"),
    ("svg", "image/svg+xml"),
    ("svgz", "image/svg+xml"),
    // Camera raw
    ("cr2", "image/x-canon-cr2"),
    ("cr3", "image/x-canon-cr3"),
    ("crw", "image/x-canon-crw"),
    ("nef", "image/x-nikon-nef"),
    ("nrw", "image/x-nikon-nrw"),
    ("arw", "image/x-sony-arw"),
    ("sr2", "image/x-sony-sr2"),
    ("dng", "image/x-adobe-dng"),
    ("orf", "image/x-olympus-orf"),
    ("rw2", "image/x-panasonic-rw2"),
    ("raf", "image/x-fuji-raf"),
    ("pef", "image/x-pentax-pef"),
    // Video
    ("mp4", "video/mp4"),
    ("m4v", "video/x-m4v"),
    ("mov", "video/quicktime"),
    ("mkv", "video/x-matroska"),
    ("webm", "video/webm"),
    ("avi", "video/x-msvideo"),
    ("wmv", "video/x-ms-wmv"),
    ("mpg", "video/mpeg"),
    ("mpeg", "video/mpeg"),
    ("3gp", "video/3gpp"),
    // Audio
    ("mp3", "audio/mpeg"),
    ("m4a", "audio/mp4"),
    ("flac", "audio/flac"),
    ("ogg", "audio/ogg"),
    ("opus", "audio/opus"),
    ("wav", "audio/x-wav"),
    ("aac", "audio/aac"),
    // Documents
    ("pdf", "application/pdf"),
    ("odt", "application/vnd.oasis.opendocument.text"),
    ("ods", "application/vnd.oasis.opendocument.spreadsheet"),
    ("odp", "application/vnd.oasis.opendocument.presentation"),
    ("odg", "application/vnd.oasis.opendocument.graphics"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    (
        "xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
    (
        "pptx",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    ),
    ("doc", "application/msword"),
    ("xls", "application/vnd.ms-excel"),
    ("ppt", "application/vnd.ms-powerpoint"),
    ("rtf", "application/rtf"),
    ("txt", "text/plain"),
    ("csv", "text/csv"),
    ("wpd", "application/wordperfect"),
    ("lwp", "application/vnd.lotus-wordpro"),
    ("sxw", "application/vnd.sun.xml.writer"),
    ("sxc", "application/vnd.sun.xml.calc"),
    // CAD
    ("dwg", "application/acad"),
    ("dxf", "application/dxf"),
    ("fcstd", "application/x-extension-fcstd"),
    ("stl", "model/x-stl"),
    ("obj", "model/x-obj"),
    ("ply", "model/x-ply"),
    ("step", "model/x-step"),
    ("stp", "model/x-step"),
    // Ebooks
    ("epub", "application/epub+zip"),
    ("mobi", "application/x-mobipocket-ebook"),
    ("azw3", "application/vnd.amazon.ebook"),
    ("fb2", "application/x-fictionbook+xml"),
];

/// Detect the mime type of a file.
///
/// Never fails: unreadable or unknown files report [`OCTET_STREAM`].
pub fn sniff(path: &Path) -> String {
    let mut header = [0u8; HEADER_LEN];
    let bytes_read = std::fs::File::open(path)
        .and_then(|mut f| read_up_to(&mut f, &mut header))
        .unwrap_or(0);

    if let Some(mime) = from_header(&header[..bytes_read]) {
        // Zip and TIFF are containers for many formats; the extension says more
        if !CONTAINERS.contains(&mime) {
            return mime.to_string();
        }
        return from_extension(path).unwrap_or(mime).to_string();
    }

    from_extension(path).unwrap_or(OCTET_STREAM).to_string()
}

fn read_up_to(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}

/// Mime for a file extension from the static table.
pub fn from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    EXTENSIONS
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| *mime)
}

/// Match the header bytes against known signatures.
pub fn from_header(header: &[u8]) -> Option<&'static str> {
    if header.len() < 4 {
        return None;
    }

    if header.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("image/jpeg");
    }
    if header.starts_with(&[0x89, b'P', b'N', b'G']) {
        return Some("image/png");
    }
    if header.starts_with(b"GIF8") {
        return Some("image/gif");
    }
    if header.starts_with(b"%PDF") {
        return Some("application/pdf");
    }
    if header.starts_with(b"II\x2A\x00") || header.starts_with(b"MM\x00\x2A") {
        return Some("image/tiff");
    }
    if header.starts_with(b"BM") {
        return Some("image/bmp");
    }
    if header.starts_with(b"RIFF") && header.len() >= 12 {
        return match &header[8..12] {
            b"WEBP" => Some("image/webp"),
            b"AVI " => Some("video/x-msvideo"),
            b"WAVE" => Some("audio/x-wav"),
            _ => None,
        };
    }
    if header.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
        return Some(if contains(header, b"webm") {
            "video/webm"
        } else {
            "video/x-matroska"
        });
    }
    if header.len() >= 12 && &header[4..8] == b"ftyp" {
        return Some(match &header[8..12] {
            b"avif" | b"avis" => "image/avif",
            b"heic" | b"heix" | b"mif1" | b"msf1" => "image/heic",
            b"qt  " => "video/quicktime",
            b"M4A " | b"M4B " => "audio/mp4",
            _ => "video/mp4",
        });
    }
    if header.starts_with(b"fLaC") {
        return Some("audio/flac");
    }
    if header.starts_with(b"OggS") {
        return Some("audio/ogg");
    }
    if header.starts_with(b"ID3") || (header[0] == 0xFF && header[1] & 0xE0 == 0xE0) {
        return Some("audio/mpeg");
    }
    if header.starts_with(b"PK\x03\x04") {
        // EPUB stores an uncompressed "mimetype" entry first
        if contains(header, b"application/epub+zip") {
            return Some("application/epub+zip");
        }
        return Some("application/zip");
    }
    if contains(header, b"<svg") {
        return Some("image/svg+xml");
    }

    None
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

/// Image format to encode for a destination mime.
///
/// Returns `None` for mimes the encoder cannot write.
pub fn image_format_for(mime: &str) -> Option<ImageFormat> {
    let format = match mime.trim().to_ascii_lowercase().as_str() {
        "image/jpg" | "image/pjpeg" => ImageFormat::Jpeg,
        "image/x-icon" => ImageFormat::Ico,
        other => ImageFormat::from_mime_type(other)?,
    };
    WRITABLE.contains(&format).then_some(format)
}

/// Whether pixels of this format can carry an alpha channel.
pub fn is_alpha_capable(format: ImageFormat) -> bool {
    matches!(
        format,
        ImageFormat::Png
            | ImageFormat::WebP
            | ImageFormat::Gif
            | ImageFormat::Tiff
            | ImageFormat::Avif
            | ImageFormat::Ico
            | ImageFormat::Tga
            | ImageFormat::Qoi
            | ImageFormat::OpenExr
    )
}
