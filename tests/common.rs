//! Test utilities & fixtures.
//! Writes small on-disk worlds into a temp dir using the `<zone>/<kind>/<vnum>.json` layout.

use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A world directory under a temp dir. Dropping it removes the files.
pub struct WorldFixture {
    dir: TempDir,
}

#[allow(dead_code)]
impl WorldFixture {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("tempdir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write raw contents at a path relative to the world root.
    pub fn write_raw(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.root().join(rel);
        std::fs::create_dir_all(path.parent().expect("parent dir")).expect("mkdir");
        std::fs::write(&path, contents).expect("write fixture");
        path
    }

    pub fn write_json(&self, rel: &str, value: Value) -> PathBuf {
        self.write_raw(rel, &value.to_string())
    }

    /// `<zone>/<zone>.json` with the given flags and reset commands.
    pub fn zone(&self, id: u32, name: &str, flags: &[&str], cmds: Value) -> &Self {
        self.write_json(
            &format!("{id}/{id}.json"),
            json!({"zone": id, "name": name, "flags": flags, "cmds": cmds}),
        );
        self
    }

    pub fn object(&self, zone: u32, vnum: u32, short_desc: &str) -> &Self {
        self.write_json(
            &format!("{zone}/object/{vnum}.json"),
            json!({"short_desc": short_desc}),
        );
        self
    }

    pub fn room(&self, zone: u32, vnum: u32, name: &str) -> &Self {
        self.write_json(&format!("{zone}/room/{vnum}.json"), json!({"name": name}));
        self
    }

    pub fn mobile(&self, zone: u32, vnum: u32, value: Value) -> &Self {
        self.write_json(&format!("{zone}/mobile/{vnum}.json"), value);
        self
    }

    /// Assembly file `<zone>/assemble/<file>.json` producing `result` from `parts`.
    pub fn recipe(&self, zone: u32, file: u32, result: u32, parts: &[u32]) -> &Self {
        self.write_json(
            &format!("{zone}/assemble/{file}.json"),
            json!({"vnum": result, "parts": parts, "cmd": ["assemble"]}),
        );
        self
    }
}

/// One `O` reset loading `object` into `room`.
#[allow(dead_code)]
pub fn load_object(object: u32, room: u32, percent: f64) -> Value {
    json!({"cmd": "O", "arg1": object, "arg2": 1, "arg3": room, "prob": percent})
}

#[allow(dead_code)]
pub fn put_object(object: u32, container: u32, percent: f64) -> Value {
    json!({"cmd": "P", "arg1": object, "arg2": 1, "arg3": container, "prob": percent})
}
