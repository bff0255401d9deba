// Copyright 2025 lalog contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Outbound reporting to the collector.

use serde::Serialize;

use lalog_core::LoadAvg;

use crate::AgentError;

#[derive(Debug, Serialize)]
struct ReportBody {
    loadavg: [f64; 3],
}

/// Posts load readings for one host to a collector.
pub struct Reporter {
    client: reqwest::Client,
    endpoint: String,
}

impl Reporter {
    /// `base_url` is the collector root; the host name becomes the path
    /// segment, matching the collector's `POST /:hostname` surface.
    pub fn new(base_url: &str, hostname: &str) -> Result<Self, AgentError> {
        if base_url.is_empty() {
            return Err(AgentError::Endpoint("empty collector URL".to_string()));
        }
        let endpoint = format!("{}/{}", base_url.trim_end_matches('/'), hostname);
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// One report. The caller decides what to do with a failure; the
    /// agent's policy is log-and-drop, never retry.
    pub async fn send(&self, load: LoadAvg) -> Result<(), AgentError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/json; charset=utf-8",
            )
            .json(&ReportBody {
                loadavg: load.as_array(),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AgentError::Rejected(status));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_base_and_hostname() {
        let reporter = Reporter::new("http://collector:8080", "web1").unwrap();
        assert_eq!(reporter.endpoint(), "http://collector:8080/web1");

        let reporter = Reporter::new("http://collector:8080/", "web1").unwrap();
        assert_eq!(reporter.endpoint(), "http://collector:8080/web1");
    }

    #[test]
    fn empty_base_url_is_rejected() {
        assert!(Reporter::new("", "web1").is_err());
    }
}
