//! Patch names.
//!
//! The synth has no notion of a patch name, so names are kept on the host in
//! a text file of `slot=name` lines (slot is 1-based) and rewritten whole
//! every time a patch is stored.

use std::cell::RefCell;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::Result;
use crate::protocol::SLOT_COUNT;

pub const UNTITLED: &str = "Untitled";

/// One name per hardware slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatchNames {
    names: Vec<String>,
}

impl Default for PatchNames {
    fn default() -> Self {
        Self {
            names: vec![UNTITLED.to_owned(); SLOT_COUNT],
        }
    }
}

impl PatchNames {
    /// Parses the name file. Lines without `=` or with a slot outside 1..=128
    /// are skipped; unlisted slots stay "Untitled".
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut names = Self::default();

        for line in text.lines() {
            let line = line.trim_end_matches(['\r', '\n']);
            let Some((slot, name)) = line.split_once('=') else {
                continue;
            };

            match slot.trim().parse::<usize>() {
                Ok(slot) if (1..=SLOT_COUNT).contains(&slot) => {
                    names.names[slot - 1] = name.to_owned();
                }
                _ => tracing::warn!("ignoring patch name line {line:?}"),
            }
        }

        names
    }

    /// Renders all 128 slots, one `slot=name` line each.
    #[must_use]
    pub fn render(&self) -> String {
        self.names
            .iter()
            .enumerate()
            .map(|(i, name)| format!("{}={name}\n", i + 1))
            .collect()
    }

    #[must_use]
    pub fn get(&self, slot: u8) -> &str {
        self.names
            .get(usize::from(slot))
            .map_or(UNTITLED, String::as_str)
    }

    pub fn set(&mut self, slot: u8, name: &str) {
        if let Some(entry) = self.names.get_mut(usize::from(slot)) {
            name.clone_into(entry);
        }
    }
}

/// Where the name table lives between sessions.
pub trait PatchNameStore {
    fn load(&mut self) -> Result<PatchNames>;

    fn save(&mut self, names: &PatchNames) -> Result<()>;
}

/// Name table in a text file. A missing file reads as all "Untitled".
pub struct FilePatchNameStore {
    path: PathBuf,
}

impl FilePatchNameStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PatchNameStore for FilePatchNameStore {
    fn load(&mut self) -> Result<PatchNames> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(PatchNames::parse(&text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!("no patch name file at {}", self.path().display());
                Ok(PatchNames::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, names: &PatchNames) -> Result<()> {
        std::fs::write(&self.path, names.render())?;
        Ok(())
    }
}

#[derive(Default)]
struct MemoryState {
    names: PatchNames,
    saved: Vec<String>,
}

/// Name table kept in memory only. Clones share the same table, so a copy
/// kept outside the controller sees every save.
#[derive(Clone, Default)]
pub struct MemoryPatchNameStore(Rc<RefCell<MemoryState>>);

impl MemoryPatchNameStore {
    #[must_use]
    pub fn with_names(names: PatchNames) -> Self {
        Self(Rc::new(RefCell::new(MemoryState {
            names,
            saved: Vec::new(),
        })))
    }

    #[must_use]
    pub fn names(&self) -> PatchNames {
        self.0.borrow().names.clone()
    }

    /// Rendered text of every save, oldest first.
    #[must_use]
    pub fn saved(&self) -> Vec<String> {
        self.0.borrow().saved.clone()
    }
}

impl PatchNameStore for MemoryPatchNameStore {
    fn load(&mut self) -> Result<PatchNames> {
        Ok(self.names())
    }

    fn save(&mut self, names: &PatchNames) -> Result<()> {
        let mut state = self.0.borrow_mut();
        state.names = names.clone();
        state.saved.push(names.render());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults_are_untitled() {
        let names = PatchNames::default();
        assert_eq!(names.get(0), UNTITLED);
        assert_eq!(names.get(127), UNTITLED);
    }

    #[test]
    fn parse_is_one_based_and_skips_junk() {
        let text = "1=Brass\r\n3=E. Piano=1\nnot a name\n0=Zero\n129=Too far\nx=Bad\n128=Last\n";
        let names = PatchNames::parse(text);

        assert_eq!(names.get(0), "Brass");
        assert_eq!(names.get(1), UNTITLED);
        // only the first '=' separates slot and name
        assert_eq!(names.get(2), "E. Piano=1");
        assert_eq!(names.get(127), "Last");
    }

    #[test]
    fn later_lines_win() {
        let names = PatchNames::parse("5=First\n5=Second\n");
        assert_eq!(names.get(4), "Second");
    }

    #[test]
    fn render_writes_all_slots() {
        let mut names = PatchNames::default();
        names.set(0, "Bells");

        let text = names.render();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 128);
        assert_eq!(lines[0], "1=Bells");
        assert_eq!(lines[127], "128=Untitled");
        assert_eq!(PatchNames::parse(&text), names);
    }

    #[test]
    fn set_out_of_range_is_ignored() {
        let mut names = PatchNames::default();
        names.set(200, "Nope");
        assert_eq!(names, PatchNames::default());
    }

    #[test]
    fn memory_store_clones_share_saves() {
        let store = MemoryPatchNameStore::default();
        let mut handle = store.clone();

        let mut names = PatchNames::default();
        names.set(1, "Harp");
        handle.save(&names).unwrap();

        assert_eq!(store.names().get(1), "Harp");
        assert_eq!(store.saved().len(), 1);
        assert!(store.saved()[0].lines().any(|l| l == "2=Harp"));
    }

    #[test]
    fn file_store_missing_file_loads_defaults() {
        let path = std::env::temp_dir().join("xfm2ctl-missing-patchnames.txt");
        let _ = fs::remove_file(&path);

        let mut store = FilePatchNameStore::new(&path);
        assert_eq!(store.path(), path.as_path());
        assert_eq!(store.load().unwrap(), PatchNames::default());
    }

    #[test]
    fn file_store_save_then_load() {
        let path = std::env::temp_dir().join(format!(
            "xfm2ctl-patchnames-{}.txt",
            std::process::id()
        ));

        let mut names = PatchNames::default();
        names.set(9, "Slap Bass");

        let mut store = FilePatchNameStore::new(&path);
        store.save(&names).unwrap();
        let loaded = store.load().unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(loaded.get(9), "Slap Bass");
    }
}
