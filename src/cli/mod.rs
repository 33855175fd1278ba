pub mod commands;

use crate::config::{ConfigOverrides, Orchestrator};
use crate::stack::ListRequest;
use clap::builder::BoolishValueParser;
use clap::parser::ValueSource;
use clap::{ArgMatches, Args, Parser, Subcommand};
use std::path::PathBuf;

pub const LIST_COMMAND: &str = "ls";
pub const NAMESPACE_ARG: &str = "namespace";

#[derive(Parser)]
#[command(name = "stackls")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "List stacks deployed on Swarm and Kubernetes", long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    #[arg(long, global = true, env = "STACKLS_CONFIG", help = "Configuration file")]
    pub config: Option<PathBuf>,

    #[arg(short = 'H', long, global = true, env = "DOCKER_HOST", help = "Daemon socket to connect to")]
    pub host: Option<String>,

    #[arg(long, global = true, help = "Use TLS")]
    pub tls: bool,

    #[arg(
        long,
        global = true,
        env = "DOCKER_TLS_VERIFY",
        value_parser = BoolishValueParser::new(),
        help = "Use TLS and verify the remote"
    )]
    pub tlsverify: bool,

    #[arg(long, global = true, env = "DOCKER_CERT_PATH", help = "Location of TLS files")]
    pub cert_path: Option<PathBuf>,

    #[arg(long, global = true, help = "Trust certs signed only by this CA")]
    pub tlscacert: Option<PathBuf>,

    #[arg(long, global = true, help = "Path to TLS certificate file")]
    pub tlscert: Option<PathBuf>,

    #[arg(long, global = true, help = "Path to TLS key file")]
    pub tlskey: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        value_enum,
        env = "DOCKER_STACK_ORCHESTRATOR",
        help = "Orchestrator to use"
    )]
    pub orchestrator: Option<Orchestrator>,

    #[arg(long, global = true, env = "KUBECONFIG", help = "Kubernetes config file")]
    pub kubeconfig: Option<PathBuf>,
}

impl From<&ConnectionArgs> for ConfigOverrides {
    fn from(args: &ConnectionArgs) -> Self {
        Self {
            config_file: args.config.clone(),
            host: args.host.clone(),
            orchestrator: args.orchestrator,
            kubeconfig: args.kubeconfig.clone(),
            tls: args.tls,
            tls_verify: args.tlsverify,
            cert_path: args.cert_path.clone(),
            ca_cert: args.tlscacert.clone(),
            cert: args.tlscert.clone(),
            key: args.tlskey.clone(),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "List stacks", visible_alias = "list")]
    Ls(ListArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    #[arg(long, help = "Pretty-print stacks using a template (table, json or a {{.Field}} template)")]
    pub format: Option<String>,

    #[arg(
        long,
        default_value = "default",
        value_delimiter = ',',
        help = "Kubernetes namespaces to use"
    )]
    pub namespace: Vec<String>,

    #[arg(long, help = "List stacks among all Kubernetes namespaces")]
    pub all_namespaces: bool,
}

impl ListArgs {
    pub fn to_request(&self) -> ListRequest {
        ListRequest::new(
            self.namespace.iter().cloned(),
            self.all_namespaces,
            self.format.clone(),
        )
    }
}

/// Whether the caller chose the namespaces rather than relying on the default
pub fn namespace_explicit(matches: &ArgMatches) -> bool {
    matches
        .subcommand_matches(LIST_COMMAND)
        .and_then(|list| list.value_source(NAMESPACE_ARG))
        .is_some_and(|source| source != ValueSource::DefaultValue)
}
