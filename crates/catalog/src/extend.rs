use model::{Error, JsonObject, JsonValue};
use std::path::{Path, PathBuf};

/// An ordered extend chain: `[leaf, parent, grandparent, ...]`.
pub type ExtendStack = Vec<JsonObject>;

const MAX_EXTEND_DEPTH: usize = 32;

/// Resolves `name_or_path` under `root`: if it names a file that exists on
/// disk, that file is the starting point directly; otherwise it's treated
/// as a bare config name and looked up via `find_config_file`.
pub fn load_and_resolve(root: &Path, name_or_path: &str) -> Result<ExtendStack, Error> {
    let start_path = if Path::new(name_or_path).is_file() {
        PathBuf::from(name_or_path)
    } else {
        find_config_file(root, name_or_path)?
    };
    resolve_extend_stack(root, &start_path)
}

/// Follows `extends` links starting from `start_path`, returning the
/// ordered stack deepest-last. Imposes a bounded depth since cycles are
/// not otherwise detected.
pub fn resolve_extend_stack(root: &Path, start_path: &Path) -> Result<ExtendStack, Error> {
    let mut stack = Vec::new();
    let mut next_path = Some(start_path.to_path_buf());

    while let Some(path) = next_path.take() {
        if stack.len() >= MAX_EXTEND_DEPTH {
            return Err(Error::Config(format!(
                "extends chain starting from {} exceeds the maximum depth of {MAX_EXTEND_DEPTH}",
                start_path.display(),
            )));
        }

        let element = load_config_file(&path)?;
        tracing::debug!(path = %path.display(), depth = stack.len(), "loaded config file");

        if let Some(name) = element.get("extends").and_then(JsonValue::as_str) {
            let target = find_config_file(root, name).map_err(|_| {
                Error::Config(format!("extends target \"{name}\" could not be resolved under {}", root.display()))
            })?;
            next_path = Some(target);
        }

        stack.push(element);
    }

    Ok(stack)
}

/// Locates `<name>.template` or `<name>.instance` under `root` by recursive
/// walk, searching extensions in that order. A second match for the same
/// extension is a fatal ambiguity rather than a silent first-match.
pub fn find_config_file(root: &Path, name: &str) -> Result<PathBuf, Error> {
    let files = walk_files(root);

    for ext in ["template", "instance"] {
        let filename = format!("{name}.{ext}");
        let matches: Vec<&PathBuf> = files
            .iter()
            .filter(|p| p.file_name().and_then(|f| f.to_str()) == Some(filename.as_str()))
            .collect();

        match matches.len() {
            0 => continue,
            1 => return Ok(matches[0].clone()),
            _ => {
                return Err(Error::Config(format!(
                    "ambiguous config name \"{name}\": multiple files named \"{filename}\" found under {}",
                    root.display(),
                )))
            }
        }
    }

    Err(Error::Config(format!(
        "no config named \"{name}\" found under {} (looked for .template and .instance)",
        root.display(),
    )))
}

/// Every `.instance` file under `root`, in walk order, for `group` builds.
pub fn find_instances(root: &Path) -> Vec<PathBuf> {
    walk_files(root)
        .into_iter()
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("instance"))
        .collect()
}

fn load_config_file(path: &Path) -> Result<JsonObject, Error> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| Error::Io(std::io::Error::new(e.kind(), format!("{}: {e}", path.display()))))?;
    match serde_json::from_str::<JsonValue>(&text)? {
        JsonValue::Object(obj) => Ok(obj),
        _ => Err(Error::Config(format!(
            "{} does not contain a JSON object",
            path.display()
        ))),
    }
}

fn walk_files(dir: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    walk_into(dir, &mut out);
    out
}

fn walk_into(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            walk_into(&path, out);
        } else {
            out.push(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, name: &str, contents: &str) {
        fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn resolves_extend_chain_deepest_last() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "base.template", r#"{"a": 1, "b": {"c": 2}}"#);
        write(
            tmp.path(),
            "mid.template",
            r#"{"extends": "base", "changes": {"b": {"c": 3}}}"#,
        );
        write(tmp.path(), "leaf.instance", r#"{"extends": "mid", "d": 4}"#);

        let stack = load_and_resolve(tmp.path(), "leaf").unwrap();
        assert_eq!(stack.len(), 3);
        assert!(stack[0].get("d").is_some());
        assert!(stack[2].get("extends").is_none());
    }

    #[test]
    fn missing_extends_target_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "leaf.instance", r#"{"extends": "nope"}"#);
        assert!(load_and_resolve(tmp.path(), "leaf").is_err());
    }

    #[test]
    fn duplicate_config_name_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let sub1 = tmp.path().join("a");
        let sub2 = tmp.path().join("b");
        fs::create_dir(&sub1).unwrap();
        fs::create_dir(&sub2).unwrap();
        write(&sub1, "dup.instance", r#"{}"#);
        write(&sub2, "dup.instance", r#"{}"#);
        assert!(find_config_file(tmp.path(), "dup").is_err());
    }

    #[test]
    fn cyclical_chain_hits_depth_cap() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "a.instance", r#"{"extends": "b"}"#);
        write(tmp.path(), "b.instance", r#"{"extends": "a"}"#);
        let err = load_and_resolve(tmp.path(), "a").unwrap_err();
        assert!(err.to_string().contains("maximum depth"));
    }

    #[test]
    fn direct_path_argument_bypasses_lookup() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("standalone.instance");
        fs::write(&path, r#"{"a": 1}"#).unwrap();
        let stack = load_and_resolve(tmp.path(), path.to_str().unwrap()).unwrap();
        assert_eq!(stack.len(), 1);
    }
}
