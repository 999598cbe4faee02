//! CLI command implementations.

pub(crate) mod admin;
pub(crate) mod comments;

use std::path::PathBuf;

use clap::Args;
use memoria_client::HttpCommentService;
use memoria_comments::{Comment, Pagination, format_fecha};
use memoria_config::{CliSettings, Config};

use crate::error::CliError;
use crate::output::Output;

pub(crate) use admin::AdminCommand;
pub(crate) use comments::CommentsCommand;

/// Options shared by every command that talks to the API.
#[derive(Args)]
pub(crate) struct ConnectionArgs {
    /// Path to configuration file (default: auto-discover memoria.toml).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// API server URL (overrides config).
    #[arg(long, env = "MEMORIA_API_URL", global = true)]
    api_url: Option<String>,

    /// Administrator token for moderation commands (overrides config).
    #[arg(long, env = "MEMORIA_ADMIN_TOKEN", hide_env_values = true, global = true)]
    admin_token: Option<String>,

    /// Request timeout in seconds (overrides config).
    #[arg(long, global = true)]
    timeout: Option<u64>,
}

impl ConnectionArgs {
    /// Load config with command-line overrides applied.
    pub(crate) fn load_config(&self) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            base_url: self.api_url.clone(),
            admin_token: self.admin_token.clone(),
            timeout_secs: self.timeout,
        };
        Ok(Config::load(self.config.as_deref(), Some(&cli_settings))?)
    }
}

/// HTTP client for the configured server.
pub(crate) fn create_client(config: &Config) -> HttpCommentService {
    HttpCommentService::with_timeout(&config.api.base_url, config.api.timeout())
}

/// Print a comment list with pagination summary.
///
/// `audit` adds the poster address and the code used (admin listings).
pub(crate) fn print_comments(
    output: &Output,
    comments: &[Comment],
    pagination: Pagination,
    audit: bool,
) {
    if comments.is_empty() {
        output.info("Aún no hay comentarios.");
        return;
    }

    for comment in comments {
        output.highlight(&format!(
            "\n[{}] {} ({}) · {} · {} likes",
            comment.id,
            comment.nombre,
            comment.relacion,
            format_fecha(comment.fecha_creacion),
            comment.likes
        ));
        if audit {
            print_audit(output, comment.ip.as_deref(), comment.codigo_usado.as_deref());
        }
        output.info(&format!("  {}", comment.mensaje));

        for reply in &comment.respuestas {
            output.info(&format!(
                "    ↳ [{}] {} ({}) · {} · {} likes",
                reply.id,
                reply.nombre,
                reply.relacion,
                format_fecha(reply.fecha_creacion),
                reply.likes
            ));
            if audit {
                print_audit(output, reply.ip.as_deref(), reply.codigo_usado.as_deref());
            }
            output.info(&format!("      {}", reply.mensaje));
        }
    }

    output.info(&format!(
        "\nPágina {} de {} ({} comentarios)",
        pagination.pagina_actual, pagination.total_paginas, pagination.total_comentarios
    ));
}

fn print_audit(output: &Output, ip: Option<&str>, codigo: Option<&str>) {
    output.detail(&format!(
        "      ip: {} · código: {}",
        ip.unwrap_or("-"),
        codigo.unwrap_or("-")
    ));
}
