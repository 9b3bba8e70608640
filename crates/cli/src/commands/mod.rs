pub(crate) mod eval;
pub(crate) mod explore;
pub(crate) mod validate;

use std::io::Read;
use std::path::Path;

use lacuna_eval::Catalog;

/// Read a JSON document; `-` reads standard input.
pub(crate) fn read_json(path: &Path) -> Result<serde_json::Value, String> {
    let src = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("cannot read standard input: {}", e))?;
        buf
    } else {
        std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {}", path.display(), e))?
    };
    serde_json::from_str(&src).map_err(|e| format!("invalid JSON in {}: {}", path.display(), e))
}

/// Read a program description and build its catalog.
pub(crate) fn load_catalog(path: &Path) -> Result<Catalog, String> {
    let program = read_json(path)?;
    let catalog = Catalog::from_interchange(&program)
        .map_err(|e| format!("invalid program {}: {}", path.display(), e))?;
    tracing::debug!(
        program = %path.display(),
        functions = catalog.functions().count(),
        "program loaded"
    );
    Ok(catalog)
}
