//! Shared fixtures for blastscan integration tests.
#![allow(dead_code)]

use blastscan::remote::{JobClient, JobError, JobId, JobStatus};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary directory holding inputs and outputs for one test
pub struct TestEnvironment {
    pub temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Self {
        TestEnvironment {
            temp_dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn create_input_file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        std::fs::write(&path, contents).expect("Failed to write input file");
        path
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.temp_dir.path().join(relative)
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }
}

/// One HSP with fields in identity, align-len, bit-score order
pub fn hsp(identity: u32, align_len: u32, bit_score: f64) -> String {
    format!(
        "            <Hsp>\n\
         \x20             <Hsp_num>1</Hsp_num>\n\
         \x20             <Hsp_identity>{identity}</Hsp_identity>\n\
         \x20             <Hsp_align-len>{align_len}</Hsp_align-len>\n\
         \x20             <Hsp_bit-score>{bit_score}</Hsp_bit-score>\n\
         \x20           </Hsp>\n"
    )
}

/// A BLAST XML document wrapping `hsps` in a single hit
pub fn blast_report(hsps: &[String]) -> String {
    format!(
        "<?xml version=\"1.0\"?>\n\
         <!DOCTYPE BlastOutput PUBLIC \"-//NCBI//NCBI BlastOutput/EN\" \"http://www.ncbi.nlm.nih.gov/dtd/NCBI_BlastOutput.dtd\">\n\
         <BlastOutput>\n\
         \x20 <BlastOutput_program>blastn</BlastOutput_program>\n\
         \x20 <BlastOutput_db>nt</BlastOutput_db>\n\
         \x20 <BlastOutput_iterations>\n\
         \x20   <Iteration>\n\
         \x20     <Iteration_iter-num>1</Iteration_iter-num>\n\
         \x20     <Iteration_hits>\n\
         \x20       <Hit>\n\
         \x20         <Hit_id>gi|1|gb|TEST.1|</Hit_id>\n\
         \x20         <Hit_hsps>\n\
         {}\
         \x20         </Hit_hsps>\n\
         \x20       </Hit>\n\
         \x20     </Iteration_hits>\n\
         \x20   </Iteration>\n\
         \x20 </BlastOutput_iterations>\n\
         </BlastOutput>\n",
        hsps.concat()
    )
}

pub fn matching_report() -> String {
    blast_report(&[hsp(30000, 30000, 55400.0)])
}

pub fn non_matching_report() -> String {
    blast_report(&[hsp(180, 200, 320.5)])
}

/// In-memory job client that replays scripted answers in order
#[derive(Default)]
pub struct ScriptedClient {
    pub submissions: RefCell<VecDeque<Result<Option<String>, String>>>,
    pub statuses: RefCell<VecDeque<JobStatus>>,
    pub reports: RefCell<VecDeque<String>>,
    pub submitted: RefCell<Vec<String>>,
    pub status_checks: RefCell<u32>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accept(self, rid: &str, report: String) -> Self {
        self.submissions.borrow_mut().push_back(Ok(Some(rid.to_string())));
        self.reports.borrow_mut().push_back(report);
        self
    }

    pub fn reject(self) -> Self {
        self.submissions.borrow_mut().push_back(Ok(None));
        self
    }

    pub fn fail_transport(self, message: &str) -> Self {
        self.submissions.borrow_mut().push_back(Err(message.to_string()));
        self
    }

    pub fn statuses(self, statuses: &[JobStatus]) -> Self {
        self.statuses.borrow_mut().extend(statuses.iter().copied());
        self
    }
}

impl JobClient for ScriptedClient {
    fn submit(&self, query: &str) -> Result<Option<JobId>, JobError> {
        self.submitted.borrow_mut().push(query.to_string());
        match self.submissions.borrow_mut().pop_front() {
            Some(Ok(rid)) => Ok(rid.map(JobId::new)),
            Some(Err(message)) => Err(JobError::Transport(message)),
            None => Ok(None),
        }
    }

    fn poll_status(&self, _rid: &JobId) -> Result<JobStatus, JobError> {
        *self.status_checks.borrow_mut() += 1;
        Ok(self
            .statuses
            .borrow_mut()
            .pop_front()
            .unwrap_or(JobStatus::Ready))
    }

    fn fetch_report(&self, _rid: &JobId) -> Result<String, JobError> {
        Ok(self.reports.borrow_mut().pop_front().unwrap_or_default())
    }
}
