//! `memoria admin` subcommand group: the moderation panel.

use std::sync::Arc;

use clap::{Args, Subcommand};
use memoria_comments::{Confirm, ModerationPanel, ModerationService, ModerationSettings};
use memoria_config::Config;

use super::{ConnectionArgs, create_client, print_comments};
use crate::error::CliError;
use crate::output::Output;

/// Moderation commands (require an administrator token).
#[derive(Subcommand)]
pub(crate) enum AdminCommand {
    /// Show codes and comment settings of a memorial.
    Show(ShowArgs),
    /// List all comments with audit fields.
    List(ListArgs),
    /// Update codes and comment settings.
    Save(SaveArgs),
    /// Generate new access codes.
    Generate(GenerateArgs),
    /// Delete a comment (with its replies) or a reply.
    Delete(DeleteArgs),
}

impl AdminCommand {
    /// Execute the admin subcommand.
    pub(crate) fn execute(self, connection: &ConnectionArgs) -> Result<(), CliError> {
        let config = connection.load_config()?;
        let token = config.require_admin_token()?;
        let service: Arc<dyn ModerationService> =
            Arc::new(create_client(&config).with_admin_token(token));
        let output = Output::new();
        match self {
            Self::Show(args) => args.execute(service, &output),
            Self::List(args) => args.execute(&config, service, &output),
            Self::Save(args) => args.execute(service, &output),
            Self::Generate(args) => args.execute(service, &output),
            Self::Delete(args) => args.execute(&config, service, &output),
        }
    }
}

/// Arguments for `admin show`.
#[derive(Args)]
pub(crate) struct ShowArgs {
    /// Internal memorial identifier.
    id: String,
}

impl ShowArgs {
    fn execute(
        self,
        service: Arc<dyn ModerationService>,
        output: &Output,
    ) -> Result<(), CliError> {
        let mut panel = ModerationPanel::new(self.id, service);
        panel.load_configuration()?;
        print_settings(output, panel.form());
        Ok(())
    }
}

/// Arguments for `admin list`.
#[derive(Args)]
pub(crate) struct ListArgs {
    /// Internal memorial identifier.
    id: String,

    /// Load pages up to this one.
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    page: u32,
}

impl ListArgs {
    fn execute(
        self,
        config: &Config,
        service: Arc<dyn ModerationService>,
        output: &Output,
    ) -> Result<(), CliError> {
        let mut panel = ModerationPanel::new(self.id, service)
            .with_page_size(config.comments.admin_page_size);
        panel.load_configuration()?;
        panel.load_comments(1)?;
        while panel.pagination().pagina_actual < self.page && panel.has_more() {
            panel.load_next_page()?;
        }
        print_comments(output, panel.comments(), panel.pagination(), true);
        Ok(())
    }
}

/// Arguments for `admin save`.
///
/// Omitted fields keep their current value.
#[derive(Args)]
pub(crate) struct SaveArgs {
    /// Internal memorial identifier.
    id: String,

    /// Family access code.
    #[arg(long)]
    codigo_familiar: Option<String>,

    /// Client access code.
    #[arg(long)]
    codigo_cliente: Option<String>,

    /// Enable or disable comments.
    #[arg(long)]
    habilitados: Option<bool>,

    /// Message shown above the comments.
    #[arg(long)]
    mensaje: Option<String>,
}

impl SaveArgs {
    fn execute(
        self,
        service: Arc<dyn ModerationService>,
        output: &Output,
    ) -> Result<(), CliError> {
        let mut panel = ModerationPanel::new(self.id, service);
        panel.load_configuration()?;

        let form = panel.form_mut();
        if let Some(codigo) = self.codigo_familiar {
            form.codigo_familiar = codigo;
        }
        if let Some(codigo) = self.codigo_cliente {
            form.codigo_cliente = codigo;
        }
        if let Some(habilitados) = self.habilitados {
            form.habilitados = habilitados;
        }
        if let Some(mensaje) = self.mensaje {
            form.mensaje = mensaje;
        }

        save(&mut panel, output)
    }
}

/// Arguments for `admin generate`.
#[derive(Args)]
pub(crate) struct GenerateArgs {
    /// Internal memorial identifier.
    id: String,

    /// Regenerate only the client code.
    #[arg(long)]
    client_only: bool,

    /// Save the generated codes right away.
    #[arg(long)]
    save: bool,
}

impl GenerateArgs {
    fn execute(
        self,
        service: Arc<dyn ModerationService>,
        output: &Output,
    ) -> Result<(), CliError> {
        let mut panel = ModerationPanel::new(self.id, service);
        panel.load_configuration()?;

        if self.client_only {
            panel.generate_client_code_only()?;
        } else {
            panel.generate_both_codes()?;
        }
        output.notices(panel.drain_events());

        if self.save {
            save(&mut panel, output)?;
        } else {
            output.warning("Use --save para guardar los códigos generados.");
        }
        Ok(())
    }
}

/// Arguments for `admin delete`.
#[derive(Args)]
pub(crate) struct DeleteArgs {
    /// Internal memorial identifier.
    id: String,

    /// Comment or reply to delete.
    comment_id: String,

    /// The identifier is a reply.
    #[arg(long)]
    reply: bool,

    /// Skip the confirmation prompt.
    #[arg(short, long)]
    yes: bool,
}

impl DeleteArgs {
    fn execute(
        self,
        config: &Config,
        service: Arc<dyn ModerationService>,
        output: &Output,
    ) -> Result<(), CliError> {
        let mut panel = ModerationPanel::new(self.id, service)
            .with_page_size(config.comments.admin_page_size);
        panel.load_configuration()?;

        let accept = |_: &str| true;
        let confirm: &dyn Confirm = if self.yes { &accept } else { output };
        if !panel.delete_comment(&self.comment_id, self.reply, confirm)? {
            output.info("Cancelado.");
            return Ok(());
        }
        output.notices(panel.drain_events());
        output.info(&format!(
            "{} comentarios restantes",
            panel.pagination().total_comentarios
        ));
        Ok(())
    }
}

fn save(panel: &mut ModerationPanel, output: &Output) -> Result<(), CliError> {
    panel.save_configuration(|saved| print_settings(output, saved))?;
    output.notices(panel.drain_events());
    Ok(())
}

fn print_settings(output: &Output, settings: &ModerationSettings) {
    let or_dash = |value: &str| {
        if value.is_empty() {
            "-".to_owned()
        } else {
            value.to_owned()
        }
    };
    output.separator();
    output.highlight(if settings.habilitados {
        "Comentarios habilitados"
    } else {
        "Comentarios deshabilitados"
    });
    output.separator();
    output.info(&format!(
        "Código familiar: {}",
        or_dash(&settings.codigo_familiar)
    ));
    output.info(&format!(
        "Código cliente:  {}",
        or_dash(&settings.codigo_cliente)
    ));
    output.info(&format!("Mensaje:         {}", or_dash(&settings.mensaje)));
}
