//! Schema migration.

use crate::ProjectError;
use crate::schema::DesignSpec;

pub const LATEST_VERSION: u32 = 2;

pub fn migrate_to_latest(mut spec: DesignSpec) -> Result<DesignSpec, ProjectError> {
    while spec.version < LATEST_VERSION {
        spec = migrate_one_version(spec)?;
    }
    Ok(spec)
}

fn migrate_one_version(spec: DesignSpec) -> Result<DesignSpec, ProjectError> {
    match spec.version {
        0 => migrate_v0_to_v1(spec),
        1 => migrate_v1_to_v2(spec),
        v => Err(ProjectError::Migration {
            what: format!("No migration path from version {v}"),
        }),
    }
}

fn migrate_v0_to_v1(mut spec: DesignSpec) -> Result<DesignSpec, ProjectError> {
    spec.version = 1;
    Ok(spec)
}

/// Version 1 stored blockage in percent.
fn migrate_v1_to_v2(mut spec: DesignSpec) -> Result<DesignSpec, ProjectError> {
    spec.machine.blockage /= 100.0;
    spec.version = 2;
    Ok(spec)
}
