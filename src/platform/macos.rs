use super::PackagingSupport;

pub fn packaging_support() -> PackagingSupport {
    match which::which("iconutil") {
        Ok(path) => PackagingSupport::Available(path),
        Err(e) => {
            tracing::debug!("iconutil lookup failed: {}", e);
            PackagingSupport::Missing
        }
    }
}
