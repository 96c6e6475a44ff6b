/* 📖 # Why is the CLI minimal and hardcoded?

The CLI is intentionally kept minimal with no argument parsing or
configuration options. This approach:

1. **Reduces complexity**: No clap or similar dependency needed
2. **Simplifies testing**: Just run `fskit` in a directory
3. **Clear conventions**: Walks the current directory unless a single
   root argument is given
4. **Fast iteration**: Can add arguments later when use cases emerge

The workflow is straightforward:
1. Change to your project directory
2. Run `fskit` (or `fskit some/subdir`)
3. The directory tree is printed with per-file sizes

Exit codes:
- 0: Success (root listed, even when empty)
- 1: Error (no current directory, or the root is not a directory)
*/

use std::env;
use std::process;

use fskit_core::tracing::init_tracing;
use fskit_core::{FsPath, RealVfs, Vfs, VfsHandle};

fn main() {
    init_tracing().unwrap();

    let current_dir = env::current_dir().unwrap_or_else(|e| {
        eprintln!("Error: Failed to get current directory: {}", e);
        process::exit(1);
    });

    let root = FsPath::from(env::args().nth(1).unwrap_or_else(|| ".".to_string()));

    let vfs = VfsHandle::new(RealVfs::new(current_dir));

    match vfs.is_dir(&root) {
        Ok(true) => {}
        Ok(false) => {
            eprintln!("Error: Not a directory: {}", root);
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: Failed to inspect {}: {}", root, e);
            process::exit(1);
        }
    }

    let mut file_count = 0u64;
    let mut dir_count = 0u64;
    let mut total_bytes = 0u64;
    print_tree(
        &vfs,
        &root,
        0,
        &mut file_count,
        &mut dir_count,
        &mut total_bytes,
    );

    println!(
        "\n{} directories, {} files, {} bytes total",
        dir_count, file_count, total_bytes
    );
    process::exit(0);
}

fn print_tree(
    vfs: &VfsHandle,
    dir: &FsPath,
    depth: usize,
    file_count: &mut u64,
    dir_count: &mut u64,
    total_bytes: &mut u64,
) {
    let mut entries: Vec<FsPath> = vfs.entries(dir).iter().collect();
    entries.sort();

    for entry in entries {
        let indent = "  ".repeat(depth);
        let name = entry.file_name();
        match vfs.stat(&entry) {
            Ok(Some(stat)) if stat.is_dir() => {
                *dir_count += 1;
                println!("{}{}/", indent, name);
                print_tree(vfs, &entry, depth + 1, file_count, dir_count, total_bytes);
            }
            Ok(Some(stat)) => {
                *file_count += 1;
                *total_bytes += stat.len;
                println!("{}{} ({} bytes)", indent, name, stat.len);
            }
            Ok(None) => {
                // Vanished between listing and stat; skip it.
            }
            Err(e) => {
                eprintln!("  - Failed to inspect {}: {}", entry, e);
            }
        }
    }
}
