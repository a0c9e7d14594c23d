//! File type identification by magic bytes.

use memchr::memmem;

use crate::file_type::FileType;

/// Number of leading payload bytes the scanner classifies.
pub const SCAN_PEEK_LEN: usize = 64;

/// PE characteristic flag marking a DLL.
const IMAGE_FILE_DLL: u16 = 0x2000;

/// Classify a payload by its magic bytes.
pub fn identify(data: &[u8]) -> FileType {
    if data.len() < 4 {
        return FileType::Unknown;
    }

    match &data[..4] {
        b"ATEX" => return FileType::Atex,
        b"ATTX" => return FileType::Attx,
        b"ATEC" => return FileType::Atec,
        b"ATEP" => return FileType::Atep,
        b"ATEU" => return FileType::Ateu,
        b"ATET" => return FileType::Atet,
        b"CTEX" => return FileType::Ctex,
        b"DDS " => return FileType::Dds,
        b"\x89PNG" => return FileType::Png,
        b"OggS" => return FileType::Ogg,
        b"strs" => return FileType::StringFile,
        b"\x00\x01\x00\x00" | b"OTTO" | b"true" => return FileType::Font,
        b"asnd" => {
            return embedded_sound(&data[4..], FileType::AsndMp3, FileType::AsndOgg)
                .unwrap_or(FileType::Sound)
        }
        b"RIFF" if data.get(8..12) == Some(&b"WEBP"[..]) => return FileType::Webp,
        _ => {}
    }

    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        FileType::Jpeg
    } else if data.starts_with(b"MZ") {
        identify_pe(data)
    } else if data.starts_with(b"KB2") {
        FileType::Bink2Video
    } else if data.starts_with(b"PF") {
        identify_pack(data)
    } else if data.starts_with(&[0xEF, 0xBB, 0xBF]) {
        FileType::Utf8
    } else if data.starts_with(&[0xFF, 0xFE]) {
        FileType::Text
    } else if data.starts_with(b"ID3") || is_mpeg_sync(data) {
        FileType::Mp3
    } else if looks_like_text(data) {
        FileType::Text
    } else {
        FileType::Binary
    }
}

/// Classify only the first [`SCAN_PEEK_LEN`] bytes.
#[inline]
pub fn identify_prefix(data: &[u8]) -> FileType {
    identify(&data[..data.len().min(SCAN_PEEK_LEN)])
}

/// Re-identify from the full payload, keeping `scan_type` if that yields nothing.
pub fn refine(scan_type: FileType, data: &[u8]) -> FileType {
    match identify(data) {
        FileType::Unknown => scan_type,
        refined => refined,
    }
}

/// PF container: the payload type fourcc sits at offset 8.
fn identify_pack(data: &[u8]) -> FileType {
    let Some(fourcc) = data.get(8..12) else {
        return FileType::PackFile;
    };
    match fourcc {
        b"ASND" => embedded_sound(&data[12..], FileType::PackedMp3, FileType::PackedOgg)
            .unwrap_or(FileType::Sound),
        b"MODL" => FileType::Model,
        b"ABNK" => FileType::Bank,
        b"cntc" => FileType::GameContent,
        b"eula" => FileType::Eula,
        b"AFNT" => FileType::BitmapFont,
        _ => FileType::PackFile,
    }
}

/// Look for an embedded Ogg or MP3 stream, whichever starts first.
fn embedded_sound(body: &[u8], mp3: FileType, ogg: FileType) -> Option<FileType> {
    let ogg_at = memmem::find(body, b"OggS");
    let mp3_at = memmem::find(body, b"ID3");
    match (mp3_at, ogg_at) {
        (Some(m), Some(o)) => Some(if m < o { mp3 } else { ogg }),
        (Some(_), None) => Some(mp3),
        (None, Some(_)) => Some(ogg),
        (None, None) => None,
    }
}

fn identify_pe(data: &[u8]) -> FileType {
    let characteristics = data
        .get(0x3c..0x40)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]) as usize)
        .and_then(|pe| {
            if data.get(pe..pe.checked_add(4)?)? != b"PE\0\0" {
                return None;
            }
            let at = pe.checked_add(22)?;
            data.get(at..at + 2).map(|c| u16::from_le_bytes([c[0], c[1]]))
        });

    match characteristics {
        Some(c) if c & IMAGE_FILE_DLL != 0 => FileType::Dll,
        _ => FileType::Exe,
    }
}

/// MPEG audio layer III frame sync without an ID3 tag.
fn is_mpeg_sync(data: &[u8]) -> bool {
    data[0] == 0xFF && matches!(data[1], 0xFB | 0xFA | 0xF3 | 0xF2 | 0xE3 | 0xE2)
}

/// Valid UTF-8 (a sequence cut off at the end is allowed) without control
/// characters other than whitespace.
fn looks_like_text(data: &[u8]) -> bool {
    let valid = match std::str::from_utf8(data) {
        Ok(_) => true,
        Err(e) => e.error_len().is_none(),
    };
    valid
        && data
            .iter()
            .all(|&b| b >= 0x20 || matches!(b, b'\t' | b'\n' | b'\r'))
}
