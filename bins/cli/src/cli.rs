//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use fundbook_core::ledger::{MemberStatus, WithdrawalStatus};
use fundbook_core::query::DEFAULT_RECENT_LIMIT;
use fundbook_shared::types::{DepositId, MemberId, WithdrawalId, parse_amount};
use rust_decimal::Decimal;

/// Member fund ledger.
#[derive(Debug, Parser)]
#[command(name = "fundbook", version, about)]
pub struct Cli {
    /// Data directory (overrides `storage.data_dir`).
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in.
    Login {
        /// Username.
        username: String,
        /// Password.
        password: String,
    },
    /// Sign out.
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// Manage members.
    #[command(subcommand)]
    Member(MemberCommand),
    /// Record and browse deposits.
    #[command(subcommand)]
    Deposit(DepositCommand),
    /// Request, decide, and browse withdrawals.
    #[command(subcommand)]
    Withdrawal(WithdrawalCommand),
    /// View or change fund settings.
    #[command(subcommand)]
    Settings(SettingsCommand),
    /// Fund totals.
    Stats,
    /// Latest deposits and approved withdrawals.
    Recent {
        /// Number of entries.
        #[arg(default_value_t = DEFAULT_RECENT_LIMIT)]
        limit: usize,
    },
    /// List members whose balance disagrees with their records.
    Reconcile,
    /// Print an Argon2id hash for `auth.password_hash`.
    HashPassword {
        /// Password to hash.
        password: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum MemberCommand {
    /// Add a member with a zero balance.
    Add(MemberFields),
    /// List members.
    List {
        /// Only members with this status.
        #[arg(long, value_parser = member_status)]
        status: Option<MemberStatus>,
    },
    /// Show a member and their transaction history.
    Show {
        /// Member id.
        id: MemberId,
    },
    /// Edit a member's profile.
    Update {
        /// Member id.
        id: MemberId,
        /// New name.
        #[arg(long)]
        name: Option<String>,
        /// New email.
        #[arg(long)]
        email: Option<String>,
        /// New phone.
        #[arg(long)]
        phone: Option<String>,
        /// New status.
        #[arg(long, value_parser = member_status)]
        status: Option<MemberStatus>,
        /// New profile picture reference.
        #[arg(long, conflicts_with = "clear_picture")]
        picture: Option<String>,
        /// Remove the profile picture.
        #[arg(long)]
        clear_picture: bool,
    },
    /// Delete a member. Their records are kept.
    Delete {
        /// Member id.
        id: MemberId,
    },
    /// Find members by name, email, or phone.
    Search {
        /// Text to look for.
        query: String,
    },
}

#[derive(Debug, Args)]
pub struct MemberFields {
    /// Display name.
    pub name: String,
    /// Contact email.
    #[arg(long, default_value = "")]
    pub email: String,
    /// Contact phone.
    #[arg(long, default_value = "")]
    pub phone: String,
    /// Add as inactive.
    #[arg(long)]
    pub inactive: bool,
    /// Profile picture reference.
    #[arg(long)]
    pub picture: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum DepositCommand {
    /// Record a deposit.
    Add {
        /// Member id.
        member: MemberId,
        /// Amount, e.g. `1,500.00` or `Rs. 1500`.
        #[arg(value_parser = parse_amount)]
        amount: Decimal,
        /// Who made the deposit.
        #[arg(long = "from", default_value = "")]
        depositor_info: String,
    },
    /// List deposits.
    List {
        /// Only this member's deposits.
        #[arg(long)]
        member: Option<MemberId>,
    },
    /// Delete a deposit and reverse its credit.
    Delete {
        /// Deposit id.
        id: DepositId,
    },
    /// Find deposits by member name or depositor.
    Search {
        /// Text to look for.
        query: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum WithdrawalCommand {
    /// File a pending withdrawal request.
    Request {
        /// Member id.
        member: MemberId,
        /// Amount.
        #[arg(value_parser = parse_amount)]
        amount: Decimal,
        /// Reason for the request.
        #[arg(long)]
        reason: Option<String>,
    },
    /// Approve a pending request and debit the member.
    Approve {
        /// Withdrawal id.
        id: WithdrawalId,
    },
    /// Deny a pending request.
    Deny {
        /// Withdrawal id.
        id: WithdrawalId,
    },
    /// Delete a withdrawal record. Approved amounts are not refunded.
    Delete {
        /// Withdrawal id.
        id: WithdrawalId,
    },
    /// List withdrawals.
    List {
        /// Only withdrawals in this state.
        #[arg(long, value_parser = withdrawal_status)]
        status: Option<WithdrawalStatus>,
        /// Only withdrawals whose member name contains this.
        #[arg(long)]
        search: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Show settings.
    Show,
    /// Set the advisory withdrawal limit.
    SetLimit {
        /// New limit.
        #[arg(value_parser = parse_amount)]
        amount: Decimal,
    },
}

fn member_status(s: &str) -> Result<MemberStatus, String> {
    MemberStatus::parse(s).ok_or_else(|| format!("expected active or inactive, got '{s}'"))
}

fn withdrawal_status(s: &str) -> Result<WithdrawalStatus, String> {
    WithdrawalStatus::parse(s)
        .ok_or_else(|| format!("expected pending, approved, or denied, got '{s}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_deposit_add() {
        let member = MemberId::new();
        let member_arg = member.to_string();
        let cli = Cli::try_parse_from([
            "fundbook",
            "deposit",
            "add",
            member_arg.as_str(),
            "1,500.50",
            "--from",
            "brother",
        ])
        .unwrap();
        match cli.command {
            Command::Deposit(DepositCommand::Add {
                member: parsed,
                amount,
                depositor_info,
            }) => {
                assert_eq!(parsed, member);
                assert_eq!(amount, Decimal::new(150_050, 2));
                assert_eq!(depositor_info, "brother");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_recent_defaults_to_five() {
        let cli = Cli::try_parse_from(["fundbook", "recent"]).unwrap();
        assert!(matches!(cli.command, Command::Recent { limit: 5 }));
    }

    #[test]
    fn test_bad_status_rejected() {
        assert!(Cli::try_parse_from(["fundbook", "withdrawal", "list", "--status", "maybe"]).is_err());
        assert!(Cli::try_parse_from(["fundbook", "member", "add", "Ram", "--inactive"]).is_ok());
    }
}
