use std::collections::HashSet;

const NAME_BASE: &str = "sync";
const ROOT_TOKEN: &str = "_root_";
const FALLBACK_NAME_LEN: usize = 8;

/// Suggest a readable job name from the source and destination folders.
///
/// `sync_<source leaf>_<destination leaf>`, with an increasing numeric suffix appended
/// to that candidate until it no longer collides with `existing`.
pub fn generate_unique_name<'a, I>(existing: I, source: &str, destination: &str) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let existing: HashSet<&str> = existing.into_iter().collect();

    let mut candidate = NAME_BASE.to_string();
    for path in [source, destination] {
        if !path.is_empty() {
            candidate.push('_');
            candidate.push_str(last_segment(path));
        }
    }

    if candidate.is_empty() {
        candidate = random_lowercase(FALLBACK_NAME_LEN);
    }

    if !existing.contains(candidate.as_str()) {
        return candidate;
    }

    let mut suffix: u64 = 1;
    loop {
        let name = format!("{candidate}{suffix}");
        if !existing.contains(name.as_str()) {
            return name;
        }
        suffix += 1;
    }
}

fn last_segment(path: &str) -> &str {
    if path == "/" {
        return ROOT_TOKEN;
    }
    match path.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

fn random_lowercase(len: usize) -> String {
    let mut out = String::with_capacity(len);
    while out.len() < len {
        for byte in uuid::Uuid::new_v4().as_bytes() {
            if out.len() == len {
                break;
            }
            out.push((b'a' + byte % 26) as char);
        }
    }
    out
}
