use minify_js::{minify, Session, TopLevelMode};
use sha2::{Digest, Sha256};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

fn main() {
    let Ok(manifest) = env::var("CARGO_MANIFEST_DIR") else {
        return;
    };
    let templates = Path::new(&manifest).join("src/templates");
    // Written into the source tree so `--ui-dir ./static` works without the target dir
    let output = Path::new(&manifest).join("static");

    if !templates.exists() {
        return;
    }

    println!("cargo:rerun-if-changed={}", templates.display());
    for path in assets(&templates, &["js", "css"]) {
        println!("cargo:rerun-if-changed={}", path.display());
    }

    let _ = fs::create_dir_all(&output);

    build_js(&templates, &output);
    build_css(&templates, &output);
}

/// Template assets with one of `extensions`, sorted so the bundle is stable
fn assets(templates: &Path, extensions: &[&str]) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(templates)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| extensions.contains(&ext))
        })
        .map(|e| e.path().to_path_buf())
        .collect();
    files.sort();
    files
}

fn concat(templates: &Path, files: &[PathBuf], banner: fn(&str) -> String) -> String {
    let mut combined = String::new();
    for file in files {
        let Ok(content) = fs::read_to_string(file) else {
            continue;
        };
        if content.trim().is_empty() {
            continue;
        }
        let rel = file.strip_prefix(templates).unwrap_or(file);
        combined.push_str(&banner(&rel.display().to_string()));
        combined.push_str(&content);
        combined.push('\n');
    }
    combined
}

fn build_js(templates: &Path, output: &Path) {
    let files = assets(templates, &["js"]);
    let combined = concat(templates, &files, |name| format!("\n// === {} ===\n", name));
    if combined.trim().is_empty() {
        return;
    }

    let minified = try_minify_js(&combined).unwrap_or_else(|| combined.clone());
    write_hashed(output, "app.min.js", "app.", ".min.js", &minified);

    if env::var("PROFILE").map_or(true, |p| p != "release") {
        let _ = fs::write(output.join("app.debug.js"), &combined);
    }

    println!("cargo:warning=Built app.min.js ({} bytes)", minified.len());
}

fn build_css(templates: &Path, output: &Path) {
    let files = assets(templates, &["css"]);
    let combined = concat(templates, &files, |name| format!("\n/* === {} === */\n", name));
    if combined.trim().is_empty() {
        return;
    }

    let minified = minify_css(&combined);
    write_hashed(output, "styles.min.css", "styles.", ".min.css", &minified);
    println!(
        "cargo:warning=Built styles.min.css ({} bytes)",
        minified.len()
    );
}

/// Writes `name` plus a content-hashed `{prefix}{hash}{suffix}` copy, dropping stale hashed copies
fn write_hashed(output: &Path, name: &str, prefix: &str, suffix: &str, content: &str) {
    let hash = hex::encode(Sha256::digest(content.as_bytes()));
    let short = &hash[..8];

    clean_old_hash_files(output, prefix, suffix, short);

    let _ = fs::write(output.join(format!("{}{}{}", prefix, short, suffix)), content);
    let _ = fs::write(output.join(name), content);
}

fn try_minify_js(source: &str) -> Option<String> {
    use std::panic::{catch_unwind, AssertUnwindSafe};
    let src = source.to_string();
    catch_unwind(AssertUnwindSafe(|| {
        let session = Session::new();
        let mut out = Vec::new();
        minify(&session, TopLevelMode::Module, src.as_bytes(), &mut out).ok()?;
        String::from_utf8(out).ok()
    }))
    .ok()?
}

fn minify_css(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut in_comment = false;
    let mut chars = css.chars().peekable();

    while let Some(c) = chars.next() {
        if in_comment {
            if c == '*' && chars.peek() == Some(&'/') {
                chars.next();
                in_comment = false;
            }
            continue;
        }
        if c == '/' && chars.peek() == Some(&'*') {
            chars.next();
            in_comment = true;
            continue;
        }
        if c.is_whitespace() {
            if !out.ends_with(|ch: char| ch.is_whitespace() || "{:;,".contains(ch))
                && chars.peek().is_some_and(|&n| !"{}:;,".contains(n))
            {
                out.push(' ');
            }
            continue;
        }
        out.push(c);
    }
    out
}

fn clean_old_hash_files(output: &Path, prefix: &str, suffix: &str, current_hash: &str) {
    let Ok(entries) = fs::read_dir(output) else {
        return;
    };
    for entry in entries.filter_map(|e| e.ok()) {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !name.starts_with(prefix)
            || !name.ends_with(suffix)
            || name.len() <= prefix.len() + suffix.len()
        {
            continue;
        }
        let hash_part = &name[prefix.len()..name.len() - suffix.len()];
        if hash_part.len() == 8
            && hash_part.chars().all(|c| c.is_ascii_hexdigit())
            && hash_part != current_hash
        {
            let _ = fs::remove_file(entry.path());
        }
    }
}
