//! Concrete file formats found in archives.

use std::fmt;

/// Coarse classification of a [`FileType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Image,
    Executable,
    Library,
    Text,
    Sound,
    Font,
    BitmapFont,
    Video,
    Model,
    Binary,
    Unknown,
}

/// Concrete format of an archive entry, decided by [`crate::identify`].
///
/// The discriminant is the stable on-disk code used by index caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum FileType {
    Unknown = 0,
    Binary = 1,
    PackFile = 2,

    // Textures
    Atex = 10,
    Attx = 11,
    Atec = 12,
    Atep = 13,
    Ateu = 14,
    Atet = 15,
    Ctex = 16,
    Dds = 17,
    Jpeg = 18,
    Png = 19,
    Webp = 20,

    // Executables
    Exe = 30,
    Dll = 31,

    // Text
    Eula = 40,
    StringFile = 41,
    Text = 42,
    Utf8 = 43,
    GameContent = 44,

    // Sound
    Bank = 50,
    Sound = 51,
    Ogg = 52,
    Mp3 = 53,
    AsndMp3 = 54,
    AsndOgg = 55,
    PackedMp3 = 56,
    PackedOgg = 57,

    // Fonts
    Font = 60,
    BitmapFont = 61,

    Bink2Video = 70,
    Model = 80,
}

impl FileType {
    /// Every file type, in code order.
    pub const ALL: [FileType; 33] = [
        FileType::Unknown,
        FileType::Binary,
        FileType::PackFile,
        FileType::Atex,
        FileType::Attx,
        FileType::Atec,
        FileType::Atep,
        FileType::Ateu,
        FileType::Atet,
        FileType::Ctex,
        FileType::Dds,
        FileType::Jpeg,
        FileType::Png,
        FileType::Webp,
        FileType::Exe,
        FileType::Dll,
        FileType::Eula,
        FileType::StringFile,
        FileType::Text,
        FileType::Utf8,
        FileType::GameContent,
        FileType::Bank,
        FileType::Sound,
        FileType::Ogg,
        FileType::Mp3,
        FileType::AsndMp3,
        FileType::AsndOgg,
        FileType::PackedMp3,
        FileType::PackedOgg,
        FileType::Font,
        FileType::BitmapFont,
        FileType::Bink2Video,
        FileType::Model,
    ];

    /// Stable numeric code.
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Inverse of [`FileType::code`].
    pub fn from_code(code: u8) -> Option<FileType> {
        Self::ALL.iter().copied().find(|t| t.code() == code)
    }

    /// Coarse kind of this format.
    pub fn kind(self) -> FileKind {
        use FileType::*;
        match self {
            Atex | Attx | Atec | Atep | Ateu | Atet | Ctex | Dds | Jpeg | Png | Webp => {
                FileKind::Image
            }
            Exe => FileKind::Executable,
            Dll => FileKind::Library,
            Eula | StringFile | Text | Utf8 => FileKind::Text,
            Bank | Sound | Ogg | Mp3 | AsndMp3 | AsndOgg | PackedMp3 | PackedOgg => {
                FileKind::Sound
            }
            Font => FileKind::Font,
            BitmapFont => FileKind::BitmapFont,
            Bink2Video => FileKind::Video,
            Model => FileKind::Model,
            GameContent | PackFile | Binary => FileKind::Binary,
            Unknown => FileKind::Unknown,
        }
    }

    /// Output file extension (without the dot).
    pub fn extension(self) -> &'static str {
        use FileType::*;
        match self {
            Atex | Attx | Atec | Atep | Ateu | Atet | Ctex | Dds | Jpeg | Png | Webp
            | BitmapFont => "png",
            Model => "obj",
            StringFile => "csv",
            GameContent => "xml",
            Ogg | PackedOgg | AsndOgg => "ogg",
            Mp3 | PackedMp3 | AsndMp3 | Bank => "mp3",
            Eula | Text | Utf8 => "txt",
            Bink2Video => "bk2",
            Dll => "dll",
            Exe => "exe",
            Font => "ttf",
            Sound | PackFile | Binary | Unknown => "raw",
        }
    }

    /// Short display name.
    pub fn name(self) -> &'static str {
        use FileType::*;
        match self {
            Unknown => "Unknown",
            Binary => "Binary",
            PackFile => "PackFile",
            Atex => "ATEX",
            Attx => "ATTX",
            Atec => "ATEC",
            Atep => "ATEP",
            Ateu => "ATEU",
            Atet => "ATET",
            Ctex => "CTEX",
            Dds => "DDS",
            Jpeg => "JPEG",
            Png => "PNG",
            Webp => "WEBP",
            Exe => "EXE",
            Dll => "DLL",
            Eula => "EULA",
            StringFile => "Strings",
            Text => "Text",
            Utf8 => "UTF-8",
            GameContent => "GameContent",
            Bank => "Bank",
            Sound => "Sound",
            Ogg => "OGG",
            Mp3 => "MP3",
            AsndMp3 => "asndMP3",
            AsndOgg => "asndOGG",
            PackedMp3 => "PackedMP3",
            PackedOgg => "PackedOGG",
            Font => "Font",
            BitmapFont => "BitmapFont",
            Bink2Video => "Bink2",
            Model => "Model",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
