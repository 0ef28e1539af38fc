// Compiles data/moves.ron into a postcard blob plus a phf name index.
// Both land in OUT_DIR and are pulled into src/move_data.rs with include!.

use schema::{validate_catalog, MoveData};
use std::env;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

fn main() {
    println!("cargo:rerun-if-changed=data/moves.ron");
    println!("cargo:rerun-if-changed=schema/src");

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is set by cargo");
    let out_dir = Path::new(&out_dir);

    let moves = load_moves(Path::new("data/moves.ron"));
    if let Err(err) = validate_catalog(&moves) {
        panic!("data/moves.ron is invalid: {}", err);
    }

    let bytes = postcard::to_allocvec(&moves).expect("move catalog serializes with postcard");
    fs::write(out_dir.join("move_catalog.bin"), bytes).expect("write move_catalog.bin");

    write_generated_source(&moves, &out_dir.join("generated_data.rs"));
}

fn load_moves(path: &Path) -> Vec<MoveData> {
    let source = fs::read_to_string(path)
        .unwrap_or_else(|err| panic!("failed to read {}: {}", path.display(), err));
    ron::from_str(&source).unwrap_or_else(|err| panic!("failed to parse {}: {}", path.display(), err))
}

fn write_generated_source(moves: &[MoveData], path: &Path) {
    let file = fs::File::create(path).expect("create generated_data.rs");
    let mut writer = BufWriter::new(file);

    let mut index = phf_codegen::Map::new();
    for (position, move_data) in moves.iter().enumerate() {
        index.entry(move_data.name.as_str(), &position.to_string());
    }

    writeln!(
        writer,
        "static MOVE_CATALOG_BYTES: &[u8] = include_bytes!(concat!(env!(\"OUT_DIR\"), \"/move_catalog.bin\"));"
    )
    .expect("write catalog bytes");
    writeln!(
        writer,
        "static MOVE_INDEX: phf::Map<&'static str, usize> = {};",
        index.build()
    )
    .expect("write move index");
}
