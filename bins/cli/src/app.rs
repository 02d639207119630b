//! Command dispatch over the ledger, query service, and session gate.

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, bail};
use fundbook_core::ledger::{
    Deposit, LedgerEngine, Member, MemberStatus, MemberUpdate, NewMember, Settings, Withdrawal,
    WithdrawalStatus,
};
use fundbook_core::query::{QueryService, TransactionEntry, aggregate};
use fundbook_core::session::{
    CredentialVerifier, HashedCredentials, SessionGate, StaticCredentials, User, UserRole,
    hash_password,
};
use fundbook_db::FileStore;
use fundbook_shared::AppConfig;
use fundbook_shared::config::AuthConfig;
use fundbook_shared::types::CurrencyFormat;
use tracing::debug;

use crate::cli::{
    Command, DepositCommand, MemberCommand, MemberFields, SettingsCommand, WithdrawalCommand,
};

type SharedStore = Arc<FileStore>;

/// Everything a command needs, wired over one data directory.
pub struct App {
    engine: LedgerEngine<SharedStore>,
    query: QueryService<SharedStore>,
    gate: SessionGate<SharedStore, Box<dyn CredentialVerifier>>,
    money: CurrencyFormat,
}

impl App {
    /// Opens the data directory named by `config` and wires the services.
    pub fn open(config: &AppConfig) -> anyhow::Result<Self> {
        let store = Arc::new(FileStore::open(&config.storage.data_dir).with_context(|| {
            format!(
                "failed to open data directory {}",
                config.storage.data_dir.display()
            )
        })?);
        debug!(data_dir = %store.data_dir().display(), "Opened data directory");

        let gate = SessionGate::new(Arc::clone(&store), verifier(&config.auth));
        gate.subscribe(Arc::new(|session: Option<&User>| {
            debug!(
                username = session.map(|u| u.username.as_str()),
                "Session changed"
            );
        }));

        Ok(Self {
            engine: LedgerEngine::new(Arc::clone(&store))
                .with_reversal_policy(config.ledger.reversal_policy),
            query: QueryService::new(store),
            gate,
            money: CurrencyFormat::new(config.display.currency_symbol.clone()),
        })
    }

    /// Runs one command, writing human-readable output to `out`.
    pub fn run(&self, command: Command, out: &mut dyn Write) -> anyhow::Result<()> {
        match command {
            Command::Login { username, password } => {
                let user = self.gate.authenticate(&username, &password)?;
                writeln!(out, "Signed in as {} ({})", user.username, user.role)?;
            }
            Command::Logout => {
                self.gate.end_session()?;
                writeln!(out, "Signed out")?;
            }
            Command::Whoami => match self.gate.current_session()? {
                Some(user) => writeln!(out, "{} ({})", user.username, user.role)?,
                None => writeln!(out, "Not signed in")?,
            },
            Command::Member(cmd) => self.member(cmd, out)?,
            Command::Deposit(cmd) => self.deposit(cmd, out)?,
            Command::Withdrawal(cmd) => self.withdrawal(cmd, out)?,
            Command::Settings(cmd) => self.settings(cmd, out)?,
            Command::Stats => self.stats(out)?,
            Command::Recent { limit } => {
                self.require_session()?;
                let entries = self.query.recent_transactions(limit)?;
                if entries.is_empty() {
                    writeln!(out, "No transactions yet")?;
                }
                for entry in &entries {
                    self.write_entry(out, entry)?;
                }
            }
            Command::Reconcile => {
                self.require_session()?;
                let drift = self.engine.reconcile()?;
                if drift.is_empty() {
                    writeln!(out, "All balances match their records")?;
                }
                for d in drift {
                    writeln!(
                        out,
                        "{}  {:<20} stored {}  expected {}  off by {}",
                        d.member_id,
                        d.member_name,
                        self.money.format(d.stored),
                        self.money.format(d.expected),
                        self.money.format(d.difference()),
                    )?;
                }
            }
            Command::HashPassword { password } => {
                writeln!(out, "{}", hash_password(&password)?)?;
            }
        }
        Ok(())
    }

    fn member(&self, cmd: MemberCommand, out: &mut dyn Write) -> anyhow::Result<()> {
        match cmd {
            MemberCommand::Add(MemberFields {
                name,
                email,
                phone,
                inactive,
                picture,
            }) => {
                self.require_writer()?;
                let member = self.engine.add_member(NewMember {
                    name,
                    email,
                    phone,
                    status: if inactive {
                        MemberStatus::Inactive
                    } else {
                        MemberStatus::Active
                    },
                    profile_picture: picture,
                })?;
                writeln!(out, "Added member {} ({})", member.name, member.id)?;
            }
            MemberCommand::List { status } => {
                self.require_session()?;
                let members: Vec<Member> = self
                    .query
                    .members()?
                    .into_iter()
                    .filter(|m| status.is_none_or(|s| m.status == s))
                    .collect();
                self.write_members(out, &members)?;
            }
            MemberCommand::Show { id } => {
                self.require_session()?;
                match self.query.member(id)? {
                    Some(member) => {
                        writeln!(out, "{} ({})", member.name, member.id)?;
                        writeln!(out, "  email:   {}", member.email)?;
                        writeln!(out, "  phone:   {}", member.phone)?;
                        writeln!(out, "  status:  {}", member.status)?;
                        writeln!(out, "  joined:  {}", member.joined_date.format("%Y-%m-%d"))?;
                        writeln!(out, "  balance: {}", self.money.format(member.balance))?;
                    }
                    // Deleted members keep their records; show them under a placeholder.
                    None => writeln!(out, "{} ({id})", self.query.member_display_name(id)?)?,
                }
                writeln!(out, "Transaction history:")?;
                let history = self.query.member_transaction_history(id)?;
                if history.is_empty() {
                    writeln!(out, "  No transactions yet")?;
                }
                for entry in &history {
                    self.write_entry(out, entry)?;
                }
            }
            MemberCommand::Update {
                id,
                name,
                email,
                phone,
                status,
                picture,
                clear_picture,
            } => {
                self.require_writer()?;
                let profile_picture = if clear_picture {
                    Some(None)
                } else {
                    picture.map(Some)
                };
                let member = self.engine.update_member(
                    id,
                    MemberUpdate {
                        name,
                        email,
                        phone,
                        status,
                        profile_picture,
                    },
                )?;
                writeln!(out, "Updated member {} ({})", member.name, member.id)?;
            }
            MemberCommand::Delete { id } => {
                self.require_writer()?;
                let member = self.engine.delete_member(id)?;
                writeln!(
                    out,
                    "Deleted member {}; their deposits and withdrawals are kept",
                    member.name
                )?;
            }
            MemberCommand::Search { query } => {
                self.require_session()?;
                self.write_members(out, &self.query.search_members(&query)?)?;
            }
        }
        Ok(())
    }

    fn deposit(&self, cmd: DepositCommand, out: &mut dyn Write) -> anyhow::Result<()> {
        match cmd {
            DepositCommand::Add {
                member,
                amount,
                depositor_info,
            } => {
                self.require_writer()?;
                let deposit = self.engine.record_deposit(member, amount, depositor_info)?;
                writeln!(
                    out,
                    "Recorded deposit of {} for {} ({})",
                    self.money.format(deposit.amount),
                    deposit.member_name,
                    deposit.id
                )?;
            }
            DepositCommand::List { member } => {
                self.require_session()?;
                let deposits: Vec<Deposit> = self
                    .query
                    .deposits()?
                    .into_iter()
                    .filter(|d| member.is_none_or(|m| d.member_id == m))
                    .collect();
                self.write_deposits(out, &deposits)?;
            }
            DepositCommand::Delete { id } => {
                self.require_writer()?;
                let reversal = self.engine.delete_deposit(id)?;
                match reversal.balance_after {
                    Some(balance) => writeln!(
                        out,
                        "Deleted deposit of {}; {} now has {}",
                        self.money.format(reversal.deposit.amount),
                        reversal.deposit.member_name,
                        self.money.format(balance)
                    )?,
                    None => writeln!(
                        out,
                        "Deleted deposit of {}; member no longer exists",
                        self.money.format(reversal.deposit.amount)
                    )?,
                }
                if reversal.overdrawn {
                    writeln!(out, "Warning: the member is now overdrawn")?;
                }
            }
            DepositCommand::Search { query } => {
                self.require_session()?;
                self.write_deposits(out, &self.query.search_deposits(&query)?)?;
            }
        }
        Ok(())
    }

    fn withdrawal(&self, cmd: WithdrawalCommand, out: &mut dyn Write) -> anyhow::Result<()> {
        match cmd {
            WithdrawalCommand::Request {
                member,
                amount,
                reason,
            } => {
                self.require_writer()?;
                let w = self.engine.request_withdrawal(member, amount, reason)?;
                writeln!(
                    out,
                    "Requested withdrawal of {} for {} ({})",
                    self.money.format(w.amount),
                    w.member_name,
                    w.id
                )?;
            }
            WithdrawalCommand::Approve { id } => {
                self.require_writer()?;
                let w = self.engine.approve_withdrawal(id)?;
                writeln!(
                    out,
                    "Approved withdrawal of {} for {}",
                    self.money.format(w.amount),
                    w.member_name
                )?;
            }
            WithdrawalCommand::Deny { id } => {
                self.require_writer()?;
                let w = self.engine.deny_withdrawal(id)?;
                writeln!(
                    out,
                    "Denied withdrawal of {} for {}",
                    self.money.format(w.amount),
                    w.member_name
                )?;
            }
            WithdrawalCommand::Delete { id } => {
                self.require_writer()?;
                let w = self.engine.delete_withdrawal(id)?;
                writeln!(out, "Deleted {} withdrawal {}", w.status, w.id)?;
                if w.status == WithdrawalStatus::Approved {
                    writeln!(
                        out,
                        "Note: the {} already deducted was not refunded",
                        self.money.format(w.amount)
                    )?;
                }
            }
            WithdrawalCommand::List { status, search } => {
                self.require_session()?;
                let withdrawals: Vec<Withdrawal> = match search {
                    Some(q) => self.query.search_withdrawals(&q)?,
                    None => self.query.withdrawals()?,
                }
                .into_iter()
                .filter(|w| status.is_none_or(|s| w.status == s))
                .collect();
                self.write_withdrawals(out, &withdrawals)?;
            }
        }
        Ok(())
    }

    fn settings(&self, cmd: SettingsCommand, out: &mut dyn Write) -> anyhow::Result<()> {
        match cmd {
            SettingsCommand::Show => {
                self.require_session()?;
                let settings = self.engine.settings()?;
                writeln!(
                    out,
                    "Withdrawal limit: {}",
                    self.money.format(settings.withdrawal_limit)
                )?;
            }
            SettingsCommand::SetLimit { amount } => {
                self.require_writer()?;
                self.engine.save_settings(&Settings {
                    withdrawal_limit: amount,
                })?;
                writeln!(out, "Withdrawal limit set to {}", self.money.format(amount))?;
            }
        }
        Ok(())
    }

    fn stats(&self, out: &mut dyn Write) -> anyhow::Result<()> {
        self.require_session()?;
        let stats = self.query.dashboard_stats()?;
        writeln!(out, "Total deposits:      {}", self.money.format(stats.total_deposits))?;
        writeln!(out, "Total funds:         {}", self.money.format(stats.total_funds))?;
        writeln!(
            out,
            "Available balance:   {}",
            self.money.format(stats.available_balance)
        )?;
        writeln!(
            out,
            "Withdrawal limit:    {}",
            self.money.format(stats.withdrawal_limit)
        )?;
        writeln!(
            out,
            "Members:             {} ({} active)",
            stats.total_members, stats.active_members
        )?;
        writeln!(out, "Pending withdrawals: {}", stats.pending_withdrawals)?;
        Ok(())
    }

    fn require_session(&self) -> anyhow::Result<User> {
        Ok(self.gate.require_session()?)
    }

    fn require_writer(&self) -> anyhow::Result<User> {
        let user = self.require_session()?;
        if !user.role.can_modify_ledger() {
            bail!("{} ({}) may not change the ledger", user.username, user.role);
        }
        Ok(user)
    }

    fn write_members(&self, out: &mut dyn Write, members: &[Member]) -> anyhow::Result<()> {
        if members.is_empty() {
            writeln!(out, "No members found")?;
        }
        for m in members {
            writeln!(
                out,
                "{}  {:<24} {:<8} {:>16}",
                m.id,
                m.name,
                m.status.as_str(),
                self.money.format(m.balance)
            )?;
        }
        Ok(())
    }

    fn write_deposits(&self, out: &mut dyn Write, deposits: &[Deposit]) -> anyhow::Result<()> {
        if deposits.is_empty() {
            writeln!(out, "No deposits found")?;
        }
        for d in deposits {
            writeln!(
                out,
                "{}  {}  {:<20} {:>16}  {}",
                d.id,
                d.date.format("%Y-%m-%d %H:%M"),
                d.member_name,
                self.money.format(d.amount),
                d.depositor_info
            )?;
        }
        Ok(())
    }

    fn write_withdrawals(
        &self,
        out: &mut dyn Write,
        withdrawals: &[Withdrawal],
    ) -> anyhow::Result<()> {
        if withdrawals.is_empty() {
            writeln!(out, "No withdrawals found")?;
        }
        let members = self.query.members()?;
        for w in withdrawals {
            let hint = if !w.status.is_terminal() && !aggregate::can_cover(&members, w) {
                "  (insufficient balance)"
            } else {
                ""
            };
            writeln!(
                out,
                "{}  {}  {:<20} {:>16}  {:<8}{}",
                w.id,
                w.request_date.format("%Y-%m-%d %H:%M"),
                w.member_name,
                self.money.format(w.amount),
                w.status.as_str(),
                hint
            )?;
        }
        Ok(())
    }

    fn write_entry(&self, out: &mut dyn Write, entry: &TransactionEntry) -> anyhow::Result<()> {
        let status = entry.status.map_or("", |s| s.as_str());
        writeln!(
            out,
            "  {}  {:<10} {:<20} {:>16}  {}",
            entry.occurred_at.format("%Y-%m-%d %H:%M"),
            entry.kind.as_str(),
            entry.member_name,
            self.money.format(entry.amount),
            status
        )?;
        Ok(())
    }
}

/// Picks the credential check: an Argon2 hash when configured, else the plain pair.
fn verifier(auth: &AuthConfig) -> Box<dyn CredentialVerifier> {
    match &auth.password_hash {
        Some(hash) => Box::new(HashedCredentials::new(
            auth.username.as_str(),
            hash.as_str(),
            UserRole::Admin,
        )),
        None => Box::new(StaticCredentials::new(
            auth.username.as_str(),
            auth.password.as_str(),
            UserRole::Admin,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;
    use tempfile::TempDir;

    struct Harness {
        _dir: TempDir,
        app: App,
    }

    impl Harness {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let mut config = AppConfig::default();
            config.storage.data_dir = dir.path().to_path_buf();
            let app = App::open(&config).unwrap();
            Self { _dir: dir, app }
        }

        fn run(&self, args: &[&str]) -> anyhow::Result<String> {
            let cli = Cli::try_parse_from(std::iter::once("fundbook").chain(args.iter().copied()))?;
            let mut out = Vec::new();
            self.app.run(cli.command, &mut out)?;
            Ok(String::from_utf8(out)?)
        }
    }

    #[test]
    fn test_mutations_need_a_session() {
        let h = Harness::new();
        let err = h.run(&["member", "add", "Ram"]).unwrap_err();
        assert!(err.to_string().contains("Not signed in"));
        assert!(h.run(&["login", "admin", "wrong"]).is_err());
        assert!(h.run(&["login", "admin", "admin123"]).unwrap().contains("Signed in"));
        assert!(h.run(&["member", "add", "Ram"]).is_ok());
    }

    #[test]
    fn test_walkthrough_output() {
        let h = Harness::new();
        h.run(&["login", "admin", "admin123"]).unwrap();
        h.run(&["member", "add", "Ram"]).unwrap();
        let id = h.app.query.members().unwrap()[0].id.to_string();

        h.run(&["deposit", "add", id.as_str(), "1000", "--from", "cash"]).unwrap();
        h.run(&["withdrawal", "request", id.as_str(), "400"]).unwrap();
        let wid = h.app.query.withdrawals().unwrap()[0].id.to_string();
        let approved = h.run(&["withdrawal", "approve", wid.as_str()]).unwrap();
        assert!(approved.contains("Rs. 400.00"));

        let stats = h.run(&["stats"]).unwrap();
        assert!(stats.contains("Total funds:         Rs. 600.00"));

        let recent = h.run(&["recent"]).unwrap();
        assert!(recent.contains("-Rs. 400.00"));

        assert!(
            h.run(&["reconcile"])
                .unwrap()
                .contains("All balances match")
        );
    }

    #[test]
    fn test_show_deleted_member_keeps_history() {
        let h = Harness::new();
        h.run(&["login", "admin", "admin123"]).unwrap();
        h.run(&["member", "add", "Ram"]).unwrap();
        let id = h.app.query.members().unwrap()[0].id.to_string();
        h.run(&["deposit", "add", id.as_str(), "250"]).unwrap();
        h.run(&["member", "delete", id.as_str()]).unwrap();

        let shown = h.run(&["member", "show", id.as_str()]).unwrap();
        assert!(shown.starts_with(&format!("Unknown member ({id})")));
        assert!(shown.contains("Transaction history:"));
        assert!(shown.contains("Rs. 250.00"));
        assert!(!shown.contains("balance:"));
    }

    #[test]
    fn test_pending_list_flags_uncovered_requests() {
        let h = Harness::new();
        h.run(&["login", "admin", "admin123"]).unwrap();
        h.run(&["member", "add", "Sita"]).unwrap();
        let id = h.app.query.members().unwrap()[0].id.to_string();
        h.run(&["deposit", "add", id.as_str(), "300"]).unwrap();
        h.run(&["withdrawal", "request", id.as_str(), "200"]).unwrap();
        h.run(&["withdrawal", "request", id.as_str(), "500"]).unwrap();

        let listed = h.run(&["withdrawal", "list", "--status", "pending"]).unwrap();
        let lines: Vec<&str> = listed.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(!lines[0].contains("insufficient balance"));
        assert!(lines[1].contains("insufficient balance"));
    }

    #[test]
    fn test_whoami_and_logout() {
        let h = Harness::new();
        assert_eq!(h.run(&["whoami"]).unwrap(), "Not signed in\n");
        h.run(&["login", "admin", "admin123"]).unwrap();
        assert_eq!(h.run(&["whoami"]).unwrap(), "admin (admin)\n");
        h.run(&["logout"]).unwrap();
        assert!(h.run(&["stats"]).is_err());
    }

    #[test]
    fn test_hashed_verifier_is_used_when_configured() {
        let hash = hash_password("s3cret").unwrap();
        let auth = AuthConfig {
            password_hash: Some(hash),
            ..AuthConfig::default()
        };
        let v = verifier(&auth);
        assert_eq!(v.verify("admin", "s3cret").unwrap(), Some(UserRole::Admin));
        assert_eq!(v.verify("admin", "admin123").unwrap(), None);
    }
}
