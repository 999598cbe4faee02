//! `memoria comments` subcommand group: the public panel.

use std::sync::Arc;

use clap::{Args, Subcommand};
use memoria_comments::{
    CommentInput, CommentPanel, CommentService, MemorySessionStore, PanelState, Relacion,
};
use memoria_config::Config;

use super::{ConnectionArgs, create_client, print_comments};
use crate::error::CliError;
use crate::output::Output;

/// Public comment commands.
#[derive(Subcommand)]
pub(crate) enum CommentsCommand {
    /// List comments of a memorial.
    List(ListArgs),
    /// Post a comment.
    Post(PostArgs),
    /// Reply to a comment (requires the client code).
    Reply(ReplyArgs),
    /// Like a comment or reply.
    Like(LikeArgs),
}

impl CommentsCommand {
    /// Execute the comments subcommand.
    pub(crate) fn execute(self, connection: &ConnectionArgs) -> Result<(), CliError> {
        let config = connection.load_config()?;
        let service: Arc<dyn CommentService> = Arc::new(create_client(&config));
        match self {
            Self::List(args) => args.execute(&config, service),
            Self::Post(args) => args.execute(&config, service),
            Self::Reply(args) => args.execute(&config, service),
            Self::Like(args) => args.execute(&config, service),
        }
    }
}

/// Arguments for `comments list`.
#[derive(Args)]
pub(crate) struct ListArgs {
    /// Public memorial identifier (QR code).
    qr: String,

    /// Load pages up to this one.
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    page: u32,
}

impl ListArgs {
    fn execute(self, config: &Config, service: Arc<dyn CommentService>) -> Result<(), CliError> {
        let output = Output::new();
        let Some(mut panel) = open_panel(&self.qr, config, service, &output)? else {
            return Ok(());
        };

        while panel.pagination().pagina_actual < self.page && panel.has_more() {
            panel.load_next_page()?;
        }

        if let Some(mensaje) = panel.config().and_then(|c| c.mensaje.as_deref()) {
            output.info(mensaje);
        }
        print_comments(&output, panel.comments(), panel.pagination(), false);
        Ok(())
    }
}

/// Arguments for `comments post`.
#[derive(Args)]
pub(crate) struct PostArgs {
    /// Public memorial identifier (QR code).
    qr: String,

    /// Comment text.
    #[arg(short, long)]
    mensaje: String,

    /// Display name (default: Anónimo).
    #[arg(short, long)]
    nombre: Option<String>,

    /// Relationship to the person remembered.
    #[arg(short, long, default_value = "familiar")]
    relacion: String,

    /// Access code (family or client).
    #[arg(long)]
    code: Option<String>,
}

impl PostArgs {
    fn execute(self, config: &Config, service: Arc<dyn CommentService>) -> Result<(), CliError> {
        let output = Output::new();
        let Some(mut panel) = open_panel(&self.qr, config, service, &output)? else {
            return Ok(());
        };

        if let Some(code) = &self.code {
            panel.validate_code(code)?;
        }

        *panel.comment_form_mut() = CommentInput {
            nombre: self.nombre.unwrap_or_default(),
            mensaje: self.mensaje,
            relacion: Relacion::from(self.relacion),
        };
        let result = panel.post_comment();
        output.notices(panel.drain_events());
        result?;
        Ok(())
    }
}

/// Arguments for `comments reply`.
#[derive(Args)]
pub(crate) struct ReplyArgs {
    /// Public memorial identifier (QR code).
    qr: String,

    /// Comment to reply to.
    comment_id: String,

    /// Client access code.
    #[arg(long)]
    code: String,

    /// Reply text.
    #[arg(short, long)]
    mensaje: String,

    /// Display name (default: Anónimo).
    #[arg(short, long)]
    nombre: Option<String>,

    /// Relationship to the person remembered.
    #[arg(short, long, default_value = "familiar")]
    relacion: String,
}

impl ReplyArgs {
    fn execute(self, config: &Config, service: Arc<dyn CommentService>) -> Result<(), CliError> {
        let output = Output::new();
        let Some(mut panel) = open_panel(&self.qr, config, service, &output)? else {
            return Ok(());
        };

        panel.validate_code(&self.code)?;
        output.notices(panel.drain_events());

        panel.toggle_reply_form(&self.comment_id);
        if let Some(input) = panel.reply_input_mut() {
            *input = CommentInput {
                nombre: self.nombre.unwrap_or_default(),
                mensaje: self.mensaje,
                relacion: Relacion::from(self.relacion),
            };
        }
        let result = panel.post_reply(&self.comment_id);
        output.notices(panel.drain_events());
        result?;
        Ok(())
    }
}

/// Arguments for `comments like`.
#[derive(Args)]
pub(crate) struct LikeArgs {
    /// Public memorial identifier (QR code).
    qr: String,

    /// Comment or reply to like.
    item_id: String,
}

impl LikeArgs {
    fn execute(self, config: &Config, service: Arc<dyn CommentService>) -> Result<(), CliError> {
        let output = Output::new();
        let Some(mut panel) = open_panel(&self.qr, config, service, &output)? else {
            return Ok(());
        };

        let likes = panel.like_item(&self.item_id)?;
        output.success(&format!("{} ahora tiene {likes} likes", self.item_id));
        Ok(())
    }
}

/// Build and initialize a panel; `None` when comments are disabled.
fn open_panel(
    qr: &str,
    config: &Config,
    service: Arc<dyn CommentService>,
    output: &Output,
) -> Result<Option<CommentPanel>, CliError> {
    let mut panel = CommentPanel::new(qr, service, Arc::new(MemorySessionStore::new()))
        .with_page_size(config.comments.page_size)
        .with_session_ttl(Some(config.comments.session_ttl()));
    panel.initialize()?;

    if panel.state() == &PanelState::Disabled {
        output.warning("Los comentarios están deshabilitados para este memorial.");
        return Ok(None);
    }
    Ok(Some(panel))
}
