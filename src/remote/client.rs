use super::{JobClient, JobError, JobId, JobStatus};
use crate::core::config::RemoteConfig;
use crate::{BlastScanError, Result};
use reqwest::blocking::Client;
use tracing::{debug, info};

pub const DEFAULT_ENDPOINT: &str = "https://blast.ncbi.nlm.nih.gov/Blast.cgi";

const RID_MARKER: &str = "RID = ";
const STATUS_READY: &str = "Status=READY";
const STATUS_WAITING: &str = "Status=WAITING";

/// Pull the request id out of a submission response body.
///
/// The id is the text after the first `RID = ` up to the end of that line.
pub fn extract_rid(body: &str) -> Option<JobId> {
    let (_, after) = body.split_once(RID_MARKER)?;
    let token = after.split('\n').next().unwrap_or("").trim();
    if token.is_empty() {
        None
    } else {
        Some(JobId::new(token))
    }
}

/// Interpret a status response body. READY wins if both tokens appear.
pub fn interpret_status(body: &str) -> JobStatus {
    if body.contains(STATUS_READY) {
        JobStatus::Ready
    } else if body.contains(STATUS_WAITING) {
        JobStatus::Waiting
    } else {
        JobStatus::Unknown
    }
}

/// Blocking client for the NCBI BLAST URL API.
pub struct NcbiJobClient {
    client: Client,
    endpoint: String,
    database: String,
    program: String,
}

impl NcbiJobClient {
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| BlastScanError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            database: config.database.clone(),
            program: config.program.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn get_text(&self, params: &[(&str, &str)]) -> std::result::Result<String, JobError> {
        let body = self
            .client
            .get(&self.endpoint)
            .query(params)
            .send()?
            .error_for_status()?
            .text()?;
        Ok(body)
    }
}

impl JobClient for NcbiJobClient {
    fn submit(&self, query: &str) -> std::result::Result<Option<JobId>, JobError> {
        let params = [
            ("CMD", "Put"),
            ("DATABASE", self.database.as_str()),
            ("PROGRAM", self.program.as_str()),
            ("QUERY", query),
            ("FORMAT_TYPE", "XML"),
        ];

        let body = self
            .client
            .post(&self.endpoint)
            .form(&params)
            .send()?
            .error_for_status()?
            .text()?;

        let rid = extract_rid(&body);
        match &rid {
            Some(rid) => info!("Submitted {} residues as job {}", query.chars().count(), rid),
            None => debug!("Submission response carried no RID ({} bytes)", body.len()),
        }
        Ok(rid)
    }

    fn poll_status(&self, rid: &JobId) -> std::result::Result<JobStatus, JobError> {
        let body = self.get_text(&[
            ("CMD", "Get"),
            ("RID", rid.as_str()),
            ("FORMAT_TYPE", "Text"),
            ("INFO", "STATUS"),
        ])?;
        Ok(interpret_status(&body))
    }

    fn fetch_report(&self, rid: &JobId) -> std::result::Result<String, JobError> {
        let report = self.get_text(&[
            ("CMD", "Get"),
            ("RID", rid.as_str()),
            ("FORMAT_TYPE", "XML"),
        ])?;
        debug!("Fetched {} byte report for job {}", report.len(), rid);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_rid_from_qblast_info() {
        let body = "<!--QBlastInfoBegin\n    RID = 7KX9W3RB016\n    RTOE = 21\nQBlastInfoEnd\n-->";
        assert_eq!(extract_rid(body), Some(JobId::new("7KX9W3RB016")));
    }

    #[test]
    fn test_extract_rid_missing_or_empty() {
        assert_eq!(extract_rid("<html>Error: query rejected</html>"), None);
        assert_eq!(extract_rid("RID = \nRTOE = 5"), None);
    }

    #[test]
    fn test_extract_rid_without_trailing_newline() {
        assert_eq!(extract_rid("RID = ABC123"), Some(JobId::new("ABC123")));
        assert_eq!(extract_rid("RID = ABC123\r\n"), Some(JobId::new("ABC123")));
    }

    #[test]
    fn test_interpret_status() {
        assert_eq!(interpret_status("QBlastInfoBegin\n\tStatus=READY\n"), JobStatus::Ready);
        assert_eq!(interpret_status("\tStatus=WAITING\n"), JobStatus::Waiting);
        assert_eq!(interpret_status("\tStatus=UNKNOWN\n"), JobStatus::Unknown);
        assert_eq!(interpret_status(""), JobStatus::Unknown);
    }
}
