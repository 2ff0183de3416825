//! Daily IMERG Late precipitation from the GES DISC OPeNDAP server.
//!
//! Earthdata login answers the first request with a redirect to `urs.earthdata.nasa.gov`;
//! credentials are only sent there, and the session cookie carries the way back.

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{Datelike, NaiveDate};
use indicatif::ProgressBar;
use reqwest::{header::LOCATION, redirect::Policy, Response, Url};
use tracing::{debug, info, warn};

use super::save_response;
use crate::{
    config::Credentials,
    dates::{compact_stamp, DateRange},
    error::{PipelineError, PipelineResult},
    merge::imerg_file,
};

pub const OPENDAP_BASE: &str = "https://gpm1.gesdisc.eosdis.nasa.gov/opendap/hyrax/GPM_L3/GPM_3IMERGDL.06";

pub const PRECIPITATION: &str = "precipitationCal";

const LOGIN_HOST: &str = "urs.earthdata.nasa.gov";

const MAX_REDIRECTS: usize = 10;

pub struct ImergClient {
    client: reqwest::Client,
    credentials: Credentials,
    base_url: String,
    login_host: String,
}

impl ImergClient {
    pub fn new(credentials: Credentials) -> PipelineResult<Self> {
        Self::with_base_url(credentials, OPENDAP_BASE)
    }

    pub fn with_base_url(credentials: Credentials, base_url: impl Into<String>) -> PipelineResult<Self> {
        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .cookie_store(true)
            .build()?;

        Ok(ImergClient {
            client,
            credentials,
            base_url: base_url.into(),
            login_host: LOGIN_HOST.to_string(),
        })
    }

    #[cfg(test)]
    fn with_login_host(mut self, host: &str) -> Self {
        self.login_host = host.to_string();
        self
    }

    /// NetCDF subset of the whole global `precipitationCal` grid for `date`.
    pub fn url_for(&self, date: NaiveDate) -> String {
        let stamp = compact_stamp(date);

        format!(
            "{}/{}/{:02}/3B-DAY-L.MS.MRG.3IMERG.{}-S000000-E235959.V06.nc4.nc4?{}[0:1:0][0:1:3599][0:1:1799]",
            self.base_url,
            date.year(),
            date.month(),
            stamp,
            PRECIPITATION
        )
    }

    /// Downloads `date` to `<dir>/IMERG_LATEYYYYMMDD.nc` and checks that the result is a usable
    /// precipitation grid. An unusable file is removed again.
    pub async fn fetch_day(&self, date: NaiveDate, dir: &Path, progress: &ProgressBar) -> PipelineResult<PathBuf> {
        let url = self.url_for(date);
        let path = imerg_file(dir, date);

        let response = self.get_following_login(&url).await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            warn!(date = %date, "IMERG date not available yet");
        }

        progress.set_message(format!("IMERG {}", date));
        let bytes = save_response(response, &path, progress).await?;
        debug!(path = %path.display(), bytes, "IMERG file saved");

        if let Err(e) = validate(&path) {
            let _ = fs::remove_file(&path);
            return Err(e);
        }

        Ok(path)
    }

    /// Downloads every date in `range`, returning the files that arrived intact.
    /// Dates that fail are logged and left out.
    pub async fn fetch_range(
        &self,
        range: &DateRange,
        dir: &Path,
        progress: &ProgressBar,
    ) -> PipelineResult<Vec<PathBuf>> {
        let mut saved = Vec::new();

        for date in range.iter() {
            match self.fetch_day(date, dir, &ProgressBar::hidden()).await {
                Ok(path) => saved.push(path),
                Err(e) if e.is_recoverable() => warn!(date = %date, "skipping IMERG date: {}", e),
                Err(e) => return Err(e),
            }
            progress.inc(1);
        }

        info!(downloaded = saved.len(), requested = range.len(), "IMERG download finished");

        Ok(saved)
    }

    async fn get_following_login(&self, url: &str) -> PipelineResult<Response> {
        let mut current = Url::parse(url).map_err(|e| PipelineError::Config(format!("invalid URL `{}`: {}", url, e)))?;

        let mut redirects = 0;
        loop {
            let mut request = self.client.get(current.clone());
            if current.host_str() == Some(self.login_host.as_str()) {
                request = request.basic_auth(&self.credentials.username, Some(&self.credentials.password));
            }

            // past the limit the redirect itself is handed back and fails as a non-success
            let response = request.send().await?;
            if !response.status().is_redirection() || redirects == MAX_REDIRECTS {
                return Ok(response);
            }

            current = next_location(&response)?;
            redirects += 1;
            debug!(url = %current, "following redirect");
        }
    }
}

fn next_location(response: &Response) -> PipelineResult<Url> {
    let location = response
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| PipelineError::Http {
            status: response.status().as_u16(),
            url: response.url().to_string(),
        })?;

    response.url().join(location).map_err(|_| PipelineError::Http {
        status: response.status().as_u16(),
        url: location.to_string(),
    })
}

/// The file must hold `lat` and `lon` dimensions and a `precipitationCal` variable.
fn validate(path: &Path) -> PipelineResult<()> {
    let file = netcdf::open(path).map_err(|e| PipelineError::malformed(path, e.to_string()))?;

    for dim in ["lat", "lon"] {
        if file.dimension(dim).is_none() {
            return Err(PipelineError::malformed(path, format!("no `{}` dimension", dim)));
        }
    }
    if file.variable(PRECIPITATION).is_none() {
        return Err(PipelineError::malformed(path, format!("no `{}` variable", PRECIPITATION)));
    }

    Ok(())
}

// -- Tests -------------------------------------------------------------------
