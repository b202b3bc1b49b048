use std::path::PathBuf;

/// Location of a migration script under `<dir>/migration/postgresql/`.
pub fn get_path(dir: &str, file: &str) -> PathBuf {
    let mut buf = PathBuf::new();

    for chunk in [dir, "migration", "postgresql", file] {
        buf.push(chunk);
    }

    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_path() {
        let path = get_path("/srv/payapi", "payments.sql");
        assert_eq!(
            path,
            PathBuf::from("/srv/payapi/migration/postgresql/payments.sql")
        );
    }
}
