use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleStatus {
    Succeeded,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleRun {
    pub module: String,
    pub status: ModuleStatus,
    pub error: Option<String>,
}

/// What happened to one account
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountReport {
    pub index: usize,
    pub worker: usize,
    pub wallet: String,
    pub modules: Vec<ModuleRun>,
}

impl AccountReport {
    pub fn new(index: usize, worker: usize, wallet: impl Into<String>) -> Self {
        Self {
            index,
            worker,
            wallet: wallet.into(),
            modules: Vec::new(),
        }
    }

    pub fn push(&mut self, module: &str, status: ModuleStatus, error: Option<String>) {
        self.modules.push(ModuleRun {
            module: module.to_string(),
            status,
            error,
        });
    }

    fn count(&self, status: ModuleStatus) -> usize {
        self.modules.iter().filter(|m| m.status == status).count()
    }

    pub fn succeeded(&self) -> usize {
        self.count(ModuleStatus::Succeeded)
    }

    pub fn failed(&self) -> usize {
        self.count(ModuleStatus::Failed)
    }

    pub fn skipped(&self) -> usize {
        self.count(ModuleStatus::Skipped)
    }

    /// Any failed module, or a module skipped with an error
    pub fn has_errors(&self) -> bool {
        self.failed() > 0
            || self
                .modules
                .iter()
                .any(|m| m.status == ModuleStatus::Skipped && m.error.is_some())
    }

    /// One-line summary for the account's report message
    pub fn error_summary(&self) -> String {
        match (self.failed(), self.skipped()) {
            (failed, 0) => format!("Account ended with errors ({failed} failed)"),
            (failed, skipped) => {
                format!("Account ended with errors ({failed} failed, {skipped} skipped)")
            }
        }
    }
}

/// Per-account bookkeeping for a whole run, ordered by account index
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunReport {
    pub accounts: Vec<AccountReport>,
    pub cancelled: bool,
}

impl RunReport {
    pub fn new(mut accounts: Vec<AccountReport>, cancelled: bool) -> Self {
        accounts.sort_by_key(|a| a.index);
        Self {
            accounts,
            cancelled,
        }
    }

    pub fn modules_run(&self) -> usize {
        self.accounts.iter().map(|a| a.modules.len()).sum()
    }

    pub fn succeeded(&self) -> usize {
        self.accounts.iter().map(AccountReport::succeeded).sum()
    }

    pub fn failed(&self) -> usize {
        self.accounts.iter().map(AccountReport::failed).sum()
    }

    pub fn skipped(&self) -> usize {
        self.accounts.iter().map(AccountReport::skipped).sum()
    }

    pub fn accounts_with_errors(&self) -> usize {
        self.accounts.iter().filter(|a| a.has_errors()).count()
    }
}
