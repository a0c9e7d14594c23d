//! Mapping from file types onto index categories.

use tyria_dat::FileType;

/// Category path an entry of `file_type` is filed under.
pub fn category_for(file_type: FileType) -> &'static [&'static str] {
    use FileType::*;
    match file_type {
        Atex => &["Textures", "Generic Textures"],
        Attx => &["Textures", "Terrain Textures"],
        Atec => &["Textures", "ATEC Textures"],
        Atep => &["Textures", "Map Textures"],
        Ateu => &["Textures", "UI Textures"],
        Atet => &["Textures", "ATET Textures"],
        Ctex => &["Textures", "Cube Textures"],
        Dds => &["Textures", "DDS"],
        Jpeg => &["Textures", "JPEG"],
        Png => &["Textures", "PNG"],
        Webp => &["Textures", "WebP"],
        Exe | Dll => &["Binaries"],
        Eula | Text | Utf8 => &["Text"],
        StringFile => &["Strings"],
        Bank => &["Sounds", "Banks"],
        Sound | Ogg | Mp3 | AsndMp3 | AsndOgg | PackedMp3 | PackedOgg => &["Sounds"],
        Font => &["Fonts"],
        BitmapFont => &["Fonts", "Bitmap Fonts"],
        Bink2Video => &["Videos"],
        Model => &["Models"],
        GameContent => &["Game Content"],
        PackFile => &["Pack Files"],
        Binary | Unknown => &["Unknown"],
    }
}
