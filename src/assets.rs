use std::{collections::HashMap, fs, path::Path};

use crossterm::style::Color;
use log::{info, warn};

use crate::error::{AssetError, ManifestError};
use crate::snake::Direction::{self, *};

// Terminal columns per grid cell
pub const CELL_WIDTH: usize = 2;
pub const MANIFEST_FILE: &str = "images.txt";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManifestEntry {
    pub name: String,
    pub file: String,
}

// Lines are `file.ext` (named by the text before the first '.') or
// `Logical Name = file.ext`. Skipped lines come back alongside the entries.
pub fn parse_manifest(text: &str) -> (Vec<ManifestEntry>, Vec<ManifestError>) {
    let mut entries: Vec<ManifestEntry> = vec![];
    let mut skipped = vec![];

    for (i, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }

        let entry = match line.split_once('=') {
            Some((name, file)) => (name.trim(), file.trim()),
            None => (line.split('.').next().unwrap_or("").trim(), line),
        };

        match entry {
            ("", _) | (_, "") => skipped.push(ManifestError::InvalidLine { line: i + 1, text: line.to_string() }),
            (name, _) if entries.iter().any(|e| e.name == name) => {
                skipped.push(ManifestError::DuplicateName { line: i + 1, name: name.to_string() })
            },
            (name, file) => entries.push(ManifestEntry { name: name.to_string(), file: file.to_string() }),
        }
    }

    (entries, skipped)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sprite {
    pub glyph: String,
    pub color: Option<Color>,
}

impl Sprite {
    pub fn new(glyph: &str, color: Option<Color>) -> Self {
        let mut glyph: String = glyph.chars().take(CELL_WIDTH).collect();
        while glyph.chars().count() < CELL_WIDTH {
            glyph.push(' ');
        }
        Sprite { glyph, color }
    }

    pub fn filled(ch: char, color: Color) -> Self {
        Sprite::new(&ch.to_string().repeat(CELL_WIDTH), Some(color))
    }
}

pub fn decode_sprite(file: &Path, text: &str) -> Result<Sprite, AssetError> {
    let undecodable = |reason: String| AssetError::Undecodable { file: file.to_path_buf(), reason };

    let mut lines = text.lines();
    let glyph = lines.next().unwrap_or("").trim_end_matches('\r');
    let width = glyph.chars().count();
    if width == 0 || width > CELL_WIDTH {
        return Err(undecodable(format!("glyph must be 1 to {} characters, found {}", CELL_WIDTH, width)));
    }
    if glyph.chars().any(char::is_control) {
        return Err(undecodable("glyph contains control characters".to_string()));
    }

    let color = match lines.next().map(str::trim) {
        None | Some("") => None,
        Some(name) => Some(parse_color(name).ok_or_else(|| undecodable(format!("unknown colour '{}'", name)))?),
    };

    Ok(Sprite::new(glyph, color))
}

fn parse_color(name: &str) -> Option<Color> {
    let color = match name.to_ascii_lowercase().replace(' ', "_").as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "dark_red" => Color::DarkRed,
        "green" => Color::Green,
        "dark_green" => Color::DarkGreen,
        "yellow" => Color::Yellow,
        "dark_yellow" => Color::DarkYellow,
        "blue" => Color::Blue,
        "dark_blue" => Color::DarkBlue,
        "magenta" => Color::Magenta,
        "dark_magenta" => Color::DarkMagenta,
        "cyan" => Color::Cyan,
        "dark_cyan" => Color::DarkCyan,
        "white" => Color::White,
        "grey" | "gray" => Color::Grey,
        "dark_grey" | "dark_gray" => Color::DarkGrey,
        _ => return None,
    };
    Some(color)
}

pub trait ImageProvider {
    fn resolve(&self, name: &str) -> Result<Sprite, AssetError>;
}

pub struct DirectoryImages {
    images: HashMap<String, Sprite>,
}

impl DirectoryImages {
    pub fn load(dir: &Path) -> Self {
        let manifest = dir.join(MANIFEST_FILE);
        info!("Reading file: {}", manifest.display());

        match fs::read_to_string(&manifest) {
            Ok(text) => {
                let images = Self::from_manifest(dir, &text);
                info!("Finished reading file: {} ({} images)", manifest.display(), images.len());
                images
            },
            Err(e) => {
                warn!("Error reading file: {} {}", manifest.display(), e);
                DirectoryImages { images: HashMap::new() }
            },
        }
    }

    pub fn from_manifest(dir: &Path, text: &str) -> Self {
        let (entries, skipped) = parse_manifest(text);
        for problem in &skipped {
            warn!("Skipping manifest entry, {}", problem);
        }

        let mut images = HashMap::new();
        for entry in entries {
            match load_sprite(&dir.join(&entry.file)) {
                Ok(sprite) => {
                    info!("Stored {} [{}]", entry.name, entry.file);
                    images.insert(entry.name, sprite);
                },
                Err(e) => warn!("{}", e),
            }
        }

        DirectoryImages { images }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }
}

impl ImageProvider for DirectoryImages {
    fn resolve(&self, name: &str) -> Result<Sprite, AssetError> {
        self.images.get(name).cloned().ok_or_else(|| AssetError::Missing(name.to_string()))
    }
}

fn load_sprite(file: &Path) -> Result<Sprite, AssetError> {
    let bytes = fs::read(file).map_err(|source| AssetError::Io { file: file.to_path_buf(), source })?;
    let text = String::from_utf8(bytes).map_err(|e| AssetError::Undecodable {
        file: file.to_path_buf(),
        reason: e.to_string(),
    })?;
    decode_sprite(file, &text)
}

#[derive(Clone, Debug)]
pub struct SpriteSheet {
    heads: [Sprite; 4],
    body: Sprite,
    tails: [Sprite; 4],
    pub fruit: Sprite,
    pub background: Sprite,
    pub dead: Sprite,
}

impl SpriteSheet {
    pub fn load(provider: &dyn ImageProvider) -> Self {
        let heads = Direction::ALL.map(|dir| {
            resolve_or(provider, &format!("Serpent Head {}", dir.name()), || {
                Sprite::new(&head_char(dir).to_string().repeat(CELL_WIDTH), Some(Color::Green))
            })
        });
        let tails = Direction::ALL.map(|dir| {
            resolve_or(provider, &format!("Serpent Tail {}", dir.name()), || Sprite::filled('▓', Color::Green))
        });

        SpriteSheet {
            heads,
            body: resolve_or(provider, "Serpent Body", || Sprite::filled('█', Color::Green)),
            tails,
            fruit: resolve_or(provider, "Apple", || Sprite::new("()", Some(Color::Red))),
            background: resolve_or(provider, "Snake Background", || Sprite::new(" ", None)),
            dead: Sprite::filled('X', Color::DarkRed),
        }
    }

    pub fn head(&self, direction: Direction) -> &Sprite {
        &self.heads[direction.to_bits() as usize]
    }

    pub fn body(&self) -> &Sprite {
        &self.body
    }

    pub fn tail(&self, direction: Direction) -> &Sprite {
        &self.tails[direction.to_bits() as usize]
    }
}

fn resolve_or(provider: &dyn ImageProvider, name: &str, fallback: impl FnOnce() -> Sprite) -> Sprite {
    match provider.resolve(name) {
        Ok(sprite) => sprite,
        Err(e) => {
            warn!("{}, drawing a plain glyph instead", e);
            fallback()
        },
    }
}

fn head_char(direction: Direction) -> char {
    match direction {
        Up => '^',
        Down => 'v',
        Left => '<',
        Right => '>',
    }
}
