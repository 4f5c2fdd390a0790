//! # Resource Subcommands
//!
//! Listings and quick mutations for clients, tasks, invoices, employees and
//! notifications. Tables go to stdout; `--json` prints the decoded records
//! instead.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Subcommand, ValueEnum};

use desk_client::employees::{unpaid_total, PayoutInput};
use desk_client::{DeskClient, ListQuery, QueryKey};
use desk_core::{
    due_status, format_date, format_sar, Capability, ClientId, EmployeeId, InvoiceStatus, Money,
    NotificationId, TaskId, TaskStatus,
};

use crate::auth::require;
use crate::output::{self, badge, or_dash};
use crate::GlobalOpts;

/// Paging flags shared by list commands.
#[derive(Args, Debug, Clone)]
pub struct PageArgs {
    /// Page number, starting at 1.
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    /// Rows per page (at most 100).
    #[arg(long, default_value_t = 20)]
    pub per_page: u32,
    /// Free-text search.
    #[arg(long)]
    pub search: Option<String>,
}

impl PageArgs {
    fn query(&self) -> ListQuery {
        let query = ListQuery::new().page(self.page).per_page(self.per_page);
        match &self.search {
            Some(term) => query.search(term.clone()),
            None => query,
        }
    }
}

/// Task status as typed on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatusArg {
    Pending,
    InProgress,
    Review,
    Completed,
    Cancelled,
}

impl From<TaskStatusArg> for TaskStatus {
    fn from(arg: TaskStatusArg) -> Self {
        match arg {
            TaskStatusArg::Pending => TaskStatus::Pending,
            TaskStatusArg::InProgress => TaskStatus::InProgress,
            TaskStatusArg::Review => TaskStatus::Review,
            TaskStatusArg::Completed => TaskStatus::Completed,
            TaskStatusArg::Cancelled => TaskStatus::Cancelled,
        }
    }
}

/// Invoice status as typed on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceStatusArg {
    Draft,
    Unpaid,
    PartiallyPaid,
    Paid,
    Overdue,
    Cancelled,
}

impl From<InvoiceStatusArg> for InvoiceStatus {
    fn from(arg: InvoiceStatusArg) -> Self {
        match arg {
            InvoiceStatusArg::Draft => InvoiceStatus::Draft,
            InvoiceStatusArg::Unpaid => InvoiceStatus::Unpaid,
            InvoiceStatusArg::PartiallyPaid => InvoiceStatus::PartiallyPaid,
            InvoiceStatusArg::Paid => InvoiceStatus::Paid,
            InvoiceStatusArg::Overdue => InvoiceStatus::Overdue,
            InvoiceStatusArg::Cancelled => InvoiceStatus::Cancelled,
        }
    }
}

// ---------------------------------------------------------------------------
// Clients
// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
pub struct ClientsArgs {
    #[command(subcommand)]
    pub command: ClientsCommand,
}

#[derive(Subcommand, Debug)]
pub enum ClientsCommand {
    /// List clients.
    List(PageArgs),
    /// Show one client.
    Show {
        /// Client id.
        id: u64,
    },
}

pub async fn run_clients(args: &ClientsArgs, opts: &GlobalOpts) -> Result<u8> {
    let client = opts.client()?;
    match &args.command {
        ClientsCommand::List(paging) => {
            let page = client
                .clients()
                .list(&paging.query())
                .await
                .context("failed to list clients")?;
            if opts.json {
                output::print_page_json(&page)?;
                return Ok(0);
            }
            for c in &page.items {
                println!(
                    "{:>6}  {:<32}  {:<14}  {:>14}",
                    c.id.get(),
                    c.name,
                    or_dash(c.phone.as_deref()),
                    format_sar(c.balance)
                );
            }
            println!("{}", output::page_footer(&page));
            Ok(0)
        }
        ClientsCommand::Show { id } => {
            let Some(c) = client
                .clients()
                .get(ClientId(*id))
                .await
                .context("failed to load client")?
            else {
                eprintln!("client {id} not found");
                return Ok(1);
            };
            if opts.json {
                output::print_json(&c)?;
                return Ok(0);
            }
            println!("{} (client {})", c.name, c.id.get());
            println!("  phone:    {}", or_dash(c.phone.as_deref()));
            println!("  email:    {}", or_dash(c.email.as_deref()));
            println!("  CR:       {}", or_dash(c.commercial_register.as_deref()));
            println!("  VAT:      {}", or_dash(c.tax_number.as_deref()));
            println!("  address:  {}", or_dash(c.address.as_deref()));
            println!("  balance:  {}", format_sar(c.balance));
            Ok(0)
        }
    }
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
pub struct TasksArgs {
    #[command(subcommand)]
    pub command: TasksCommand,
}

#[derive(Subcommand, Debug)]
pub enum TasksCommand {
    /// List tasks.
    List {
        #[command(flatten)]
        paging: PageArgs,
        /// Only tasks in this status.
        #[arg(long, value_enum)]
        status: Option<TaskStatusArg>,
        /// Only tasks assigned to this employee.
        #[arg(long)]
        assignee: Option<u64>,
    },
    /// Move a task to another status.
    Status {
        /// Task id.
        id: u64,
        /// New status.
        #[arg(value_enum)]
        status: TaskStatusArg,
    },
}

pub async fn run_tasks(args: &TasksArgs, opts: &GlobalOpts) -> Result<u8> {
    let client = opts.client()?;
    let color = output::use_color();
    match &args.command {
        TasksCommand::List {
            paging,
            status,
            assignee,
        } => {
            let mut query = paging.query();
            if let Some(status) = status {
                query = query.filter("status", TaskStatus::from(*status).as_str());
            }
            if let Some(assignee) = assignee {
                query = query.filter("assigned_to", assignee);
            }
            let page = client
                .tasks()
                .list(&query)
                .await
                .context("failed to list tasks")?;
            if opts.json {
                output::print_page_json(&page)?;
                return Ok(0);
            }
            let today = Utc::now().date_naive();
            for t in &page.items {
                let due = match t.due_date {
                    Some(d) if t.is_open() => format!("{} ({})", format_date(d), due_status(d, today)),
                    Some(d) => format_date(d),
                    None => "-".into(),
                };
                println!(
                    "{:>6}  {:<36}  {:<12}  {:<8}  {}",
                    t.id.get(),
                    t.title,
                    badge(&t.status, color),
                    badge(&t.priority, color),
                    due
                );
            }
            println!("{}", output::page_footer(&page));
            Ok(0)
        }
        TasksCommand::Status { id, status } => {
            require(&client, Capability::ManageTasks)?;
            let task = client
                .tasks()
                .update_status(TaskId(*id), (*status).into())
                .await
                .with_context(|| format!("failed to update task {id}"))?;
            if opts.json {
                output::print_json(&task)?;
            } else {
                println!("Task {} is now {}", task.id.get(), badge(&task.status, color));
            }
            Ok(0)
        }
    }
}

// ---------------------------------------------------------------------------
// Invoices
// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
pub struct InvoicesArgs {
    #[command(subcommand)]
    pub command: InvoicesCommand,
}

#[derive(Subcommand, Debug)]
pub enum InvoicesCommand {
    /// List invoices.
    List {
        #[command(flatten)]
        paging: PageArgs,
        /// Only invoices in this status.
        #[arg(long, value_enum)]
        status: Option<InvoiceStatusArg>,
        /// Only invoices of this client.
        #[arg(long)]
        client: Option<u64>,
    },
    /// Receivables totals.
    Summary,
}

pub async fn run_invoices(args: &InvoicesArgs, opts: &GlobalOpts) -> Result<u8> {
    let client = opts.client()?;
    let color = output::use_color();
    match &args.command {
        InvoicesCommand::List {
            paging,
            status,
            client: client_id,
        } => {
            let mut query = paging.query();
            if let Some(status) = status {
                query = query.filter("status", InvoiceStatus::from(*status).as_str());
            }
            if let Some(id) = client_id {
                query = query.filter("client_id", id);
            }
            let page = client
                .invoices()
                .list(&query)
                .await
                .context("failed to list invoices")?;
            if opts.json {
                output::print_page_json(&page)?;
                return Ok(0);
            }
            for inv in &page.items {
                println!(
                    "{:>6}  {:<12}  {:<28}  {:<16}  {:>14}  {:>14}",
                    inv.id.get(),
                    or_dash(inv.number.as_deref()),
                    or_dash(inv.client_name.as_deref()),
                    badge(&inv.status, color),
                    format_sar(inv.amount),
                    format_sar(inv.remaining())
                );
            }
            println!("{}", output::page_footer(&page));
            Ok(0)
        }
        InvoicesCommand::Summary => {
            let summary = client
                .invoices()
                .summary()
                .await
                .context("failed to load receivables summary")?;
            if opts.json {
                output::print_json(&summary)?;
                return Ok(0);
            }
            println!("invoiced:     {}", format_sar(summary.total_invoiced));
            println!("paid:         {}", format_sar(summary.total_paid));
            println!("outstanding:  {}", format_sar(summary.outstanding));
            println!(
                "overdue:      {} ({} invoices)",
                format_sar(summary.overdue),
                summary.overdue_count
            );
            Ok(0)
        }
    }
}

// ---------------------------------------------------------------------------
// Employees
// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
pub struct EmployeesArgs {
    #[command(subcommand)]
    pub command: EmployeesCommand,
}

#[derive(Subcommand, Debug)]
pub enum EmployeesCommand {
    /// List employees.
    List(PageArgs),
    /// Show unpaid commissions and payout history.
    Payouts {
        /// Employee id.
        id: u64,
    },
    /// Record a commission payout.
    Pay {
        /// Employee id.
        id: u64,
        /// Amount in SAR, e.g. `1500` or `1500.50`.
        #[arg(long)]
        amount: Money,
        /// Free-text note.
        #[arg(long)]
        note: Option<String>,
    },
}

pub async fn run_employees(args: &EmployeesArgs, opts: &GlobalOpts) -> Result<u8> {
    let client = opts.client()?;
    match &args.command {
        EmployeesCommand::List(paging) => {
            let page = client
                .employees()
                .list(&paging.query())
                .await
                .context("failed to list employees")?;
            if opts.json {
                output::print_page_json(&page)?;
                return Ok(0);
            }
            for e in &page.items {
                println!(
                    "{:>6}  {:<28}  {:<20}  {:>14}{}",
                    e.id.get(),
                    e.name,
                    or_dash(e.position.as_deref()),
                    format_sar(e.commission_balance),
                    if e.active { "" } else { "  (inactive)" }
                );
            }
            println!("{}", output::page_footer(&page));
            Ok(0)
        }
        EmployeesCommand::Payouts { id } => {
            let employee = EmployeeId(*id);
            let commissions = client
                .employees()
                .commissions(employee)
                .await
                .context("failed to load commissions")?;
            let payouts = client
                .employees()
                .payouts(employee)
                .await
                .context("failed to load payouts")?;
            if opts.json {
                output::print_json(&serde_json::json!({
                    "unpaid": unpaid_total(&commissions),
                    "commissions": commissions,
                    "payouts": payouts,
                }))?;
                return Ok(0);
            }
            println!("unpaid commissions: {}", format_sar(unpaid_total(&commissions)));
            for p in &payouts {
                println!(
                    "{:>6}  {:<12}  {:>14}  {}",
                    p.id.get(),
                    p.paid_on.map(format_date).unwrap_or_else(|| "-".into()),
                    format_sar(p.amount),
                    or_dash(p.note.as_deref())
                );
            }
            Ok(0)
        }
        EmployeesCommand::Pay { id, amount, note } => {
            require(&client, Capability::ManagePayouts)?;
            let payout = client
                .employees()
                .create_payout(
                    EmployeeId(*id),
                    &PayoutInput {
                        amount: *amount,
                        note: note.clone(),
                        paid_on: Some(Utc::now().date_naive()),
                    },
                )
                .await
                .context("failed to record payout")?;
            if opts.json {
                output::print_json(&payout)?;
            } else {
                println!("Recorded payout {} of {}", payout.id.get(), format_sar(payout.amount));
            }
            Ok(0)
        }
    }
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
pub struct NotificationsArgs {
    #[command(subcommand)]
    pub command: NotificationsCommand,
}

#[derive(Subcommand, Debug)]
pub enum NotificationsCommand {
    /// List notifications.
    List {
        #[command(flatten)]
        paging: PageArgs,
        /// Only unread notifications.
        #[arg(long)]
        unread: bool,
    },
    /// Number of unread notifications.
    Count,
    /// Mark one notification as read.
    Read {
        /// Notification id.
        id: u64,
    },
    /// Mark every notification as read.
    ReadAll,
    /// Poll the unread count and print it whenever it changes.
    Watch {
        /// Seconds between polls.
        #[arg(long, default_value_t = 30)]
        every: u64,
    },
}

pub async fn run_notifications(args: &NotificationsArgs, opts: &GlobalOpts) -> Result<u8> {
    let client = opts.client()?;
    let notifications = client.notifications();
    match &args.command {
        NotificationsCommand::List { paging, unread } => {
            let mut query = paging.query();
            if *unread {
                query = query.filter("unread", 1);
            }
            let page = notifications
                .list(&query)
                .await
                .context("failed to list notifications")?;
            if opts.json {
                output::print_page_json(&page)?;
                return Ok(0);
            }
            for n in &page.items {
                println!(
                    "{:>6} {} {:<40}  {}",
                    n.id.get(),
                    if n.is_read { " " } else { "*" },
                    n.title,
                    or_dash(n.link.as_deref())
                );
            }
            println!("{}", output::page_footer(&page));
            Ok(0)
        }
        NotificationsCommand::Count => {
            let count = notifications
                .unread_count()
                .await
                .context("failed to count notifications")?;
            if opts.json {
                output::print_json(&serde_json::json!({ "unread": count }))?;
            } else {
                println!("{count}");
            }
            Ok(0)
        }
        NotificationsCommand::Read { id } => {
            notifications
                .mark_read(NotificationId(*id))
                .await
                .with_context(|| format!("failed to mark notification {id} read"))?;
            Ok(0)
        }
        NotificationsCommand::ReadAll => {
            notifications
                .mark_all_read()
                .await
                .context("failed to mark notifications read")?;
            Ok(0)
        }
        NotificationsCommand::Watch { every } => {
            let interval = Duration::from_secs((*every).max(1));
            watch_unread(&client, interval).await
        }
    }
}

async fn watch_unread(client: &DeskClient, interval: Duration) -> Result<u8> {
    let key = QueryKey::from(["notifications", "unread-count"]);
    let fetcher = client.notifications().clone();
    let _poll = client.cache().poll(key.clone(), interval, move || {
        let fetcher = fetcher.clone();
        async move { fetcher.unread_count().await }
    });

    let mut last: Option<u64> = None;
    let mut check = tokio::time::interval(Duration::from_millis(500));
    loop {
        tokio::select! {
            _ = check.tick() => {
                let current = client.cache().get_data::<u64>(&key);
                if let Some(count) = current.filter(|c| Some(*c) != last) {
                    println!("{count} unread");
                    last = Some(count);
                }
            }
            signal = tokio::signal::ctrl_c() => {
                signal.context("failed to listen for Ctrl-C")?;
                return Ok(0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_args_build_query() {
        let args = PageArgs {
            page: 2,
            per_page: 50,
            search: Some("noor".into()),
        };
        let pairs = args.query().to_pairs();
        assert!(pairs.contains(&("page".into(), "2".into())));
        assert!(pairs.contains(&("per_page".into(), "50".into())));
        assert!(pairs.contains(&("search".into(), "noor".into())));
    }

    #[test]
    fn status_args_map_to_wire_names() {
        assert_eq!(TaskStatus::from(TaskStatusArg::InProgress).as_str(), "in_progress");
        assert_eq!(
            InvoiceStatus::from(InvoiceStatusArg::PartiallyPaid).as_str(),
            "partially_paid"
        );
    }
}
