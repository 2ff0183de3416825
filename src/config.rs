//! Run configuration: where inputs live, where outputs go, and the credentials for the
//! remote data portals.

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{Local, NaiveDate};
use serde::Deserialize;

use crate::{
    dates::compact_stamp,
    error::{PipelineError, PipelineResult},
};

pub const DEFAULT_MASK: &str = "config/mask_honduras/mask_mswx_hnd.nc4";

/// Paths for one run. Every dated folder is keyed on `stamp`, fixed when the run starts.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub workspace: PathBuf,
    pub stamp: String,
    pub mask_file: PathBuf,
}

impl RunConfig {
    pub fn new(workspace: impl Into<PathBuf>, today: NaiveDate) -> Self {
        let workspace = workspace.into();
        let mask_file = workspace.join(DEFAULT_MASK);

        RunConfig {
            workspace,
            stamp: compact_stamp(today),
            mask_file,
        }
    }

    pub fn for_today(workspace: impl Into<PathBuf>) -> Self {
        Self::new(workspace, Local::now().date_naive())
    }

    pub fn with_mask(mut self, mask_file: Option<PathBuf>) -> Self {
        if let Some(mask_file) = mask_file {
            self.mask_file = mask_file;
        }
        self
    }

    pub fn downloads_dir(&self) -> PathBuf {
        self.workspace
            .join("inputs")
            .join("downloaded_data")
            .join(&self.stamp)
    }

    pub fn mswx_input_dir(&self) -> PathBuf {
        self.downloads_dir().join("MSWX")
    }

    pub fn imerg_input_dir(&self) -> PathBuf {
        self.downloads_dir().join("IMERG")
    }

    pub fn outputs_dir(&self) -> PathBuf {
        self.workspace.join("outputs").join(&self.stamp)
    }

    pub fn et0_output_file(&self) -> PathBuf {
        self.outputs_dir().join("MSWX").join("ET0_Honduras.nc")
    }

    pub fn temp_output_file(&self) -> PathBuf {
        self.outputs_dir().join("MSWX").join("Temp_Honduras.nc")
    }

    pub fn imerg_output_file(&self) -> PathBuf {
        self.outputs_dir().join("IMERG").join("IMERG_Honduras.nc")
    }
}

/// Falls back to `~/agroclimate` when no workspace is given.
pub fn default_workspace() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("agroclimate")
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
/// Earthdata login for the GES DISC OPeNDAP server.
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Reads `{"username": ..., "password": ...}`.
    pub fn from_json_file(path: &Path) -> PipelineResult<Self> {
        let text = fs::read_to_string(path)?;

        serde_json::from_str(&text).map_err(|e| {
            PipelineError::Config(format!("invalid credentials file `{}`: {}", path.display(), e))
        })
    }

    /// Flags take precedence; the JSON file fills the gap.
    pub fn resolve(
        username: Option<String>,
        password: Option<String>,
        file: Option<&Path>,
    ) -> PipelineResult<Self> {
        match (username, password, file) {
            (Some(username), Some(password), _) => Ok(Credentials { username, password }),
            (_, _, Some(file)) => Self::from_json_file(file),
            _ => Err(PipelineError::Config(
                "Earthdata credentials missing: set EARTHDATA_USERNAME/EARTHDATA_PASSWORD or --credentials".to_string(),
            )),
        }
    }
}

// -- Tests -------------------------------------------------------------------
