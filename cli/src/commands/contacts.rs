//! Contact message commands.

use backoffice::controller::CONTACT_FILTERS;
use backoffice::forms::{ContactForm, ReplyForm};
use backoffice::models::{ContactMessage, ContactStatus};
use backoffice::{Backoffice, BackofficeError, PaginationEnvelope};
use clap::{Args, Subcommand};

use super::{emit, load_list, parse_flag, require_admin, Deleted, ListArgs};

const CONTACTS_ROUTE: &str = "/admin/contacts";

#[derive(Debug, Subcommand)]
pub enum ContactsCommand {
    /// List messages (status: new, read, in_review, replied, resolved, closed, archived or all)
    List(ListArgs),
    /// Show one message with its replies
    Get { id: String },
    /// Reply to a message; the subject defaults to "Re: <subject>"
    Reply {
        id: String,
        #[arg(long)]
        body: String,
        #[arg(long)]
        subject: Option<String>,
    },
    /// Move a message to another status
    Status { id: String, status: String },
    /// Delete a message
    Delete { id: String },
    /// Send a message through the public contact form
    Send(SendArgs),
}

#[derive(Debug, Clone, Args)]
pub struct SendArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub company: Option<String>,
    #[arg(long)]
    pub subject: String,
    #[arg(long)]
    pub message: String,
}

pub async fn run(app: &Backoffice, command: ContactsCommand) -> bool {
    match command {
        ContactsCommand::List(args) => emit(list(app, &args).await),
        ContactsCommand::Get { id } => emit(get(app, &id).await),
        ContactsCommand::Reply { id, body, subject } => {
            emit(reply(app, &id, body, subject).await)
        }
        ContactsCommand::Status { id, status } => emit(set_status(app, &id, &status).await),
        ContactsCommand::Delete { id } => emit(delete(app, &id).await),
        ContactsCommand::Send(args) => emit(send(app, args).await),
    }
}

async fn list(
    app: &Backoffice,
    args: &ListArgs,
) -> Result<PaginationEnvelope<ContactMessage>, BackofficeError> {
    require_admin(app, CONTACTS_ROUTE)?;
    let contacts = app.resources().contacts.clone();
    load_list::<_, ContactStatus, _, _>(app, CONTACT_FILTERS, args, |params| async move {
        contacts.list(&params).await
    })
    .await
}

async fn get(app: &Backoffice, id: &str) -> Result<ContactMessage, BackofficeError> {
    require_admin(app, CONTACTS_ROUTE)?;
    Ok(app.resources().contacts.get(id).await?)
}

async fn reply(
    app: &Backoffice,
    id: &str,
    body: String,
    subject: Option<String>,
) -> Result<ContactMessage, BackofficeError> {
    require_admin(app, CONTACTS_ROUTE)?;
    let message = app.resources().contacts.get(id).await?;
    let mut form = ReplyForm::replying_to(&message);
    form.body = body;
    if let Some(subject) = subject {
        form.subject = subject;
    }
    let payload = form.validate()?;
    Ok(app.resources().contacts.reply(id, &payload).await?)
}

async fn set_status(
    app: &Backoffice,
    id: &str,
    status: &str,
) -> Result<ContactMessage, BackofficeError> {
    require_admin(app, CONTACTS_ROUTE)?;
    let target: ContactStatus = parse_flag("status", status)?;
    let message = app.resources().contacts.get(id).await?;
    Ok(app.resources().contacts.transition(&message, target).await?)
}

async fn delete(app: &Backoffice, id: &str) -> Result<Deleted, BackofficeError> {
    require_admin(app, CONTACTS_ROUTE)?;
    app.resources().contacts.delete(id).await?;
    Ok(Deleted::new(id))
}

async fn send(app: &Backoffice, args: SendArgs) -> Result<ContactMessage, BackofficeError> {
    let form = ContactForm {
        name: args.name,
        email: args.email,
        phone: args.phone.unwrap_or_default(),
        company: args.company.unwrap_or_default(),
        subject: args.subject,
        message: args.message,
    };
    let message = form.validate()?;
    Ok(app.resources().contacts.create(&message).await?)
}
