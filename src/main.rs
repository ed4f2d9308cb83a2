use anyhow::Context;
use clap::{Parser, Subcommand};

use hr_authz::authz::{
    Action, Enforcer, PolicyEvaluator, Resource, Role, RolePolicy, StaticPolicyEvaluator,
};
use hr_authz::config::{load_env, AppConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Query the HR dashboard access policy", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decide whether a role may perform an action on a resource
    Check {
        role: String,
        resource: String,
        action: String,
    },
    /// Print the visibility scope of a role
    Scope { role: String },
    /// Dump the policy table as JSON
    Table {
        /// Only dump this role
        #[arg(long)]
        role: Option<String>,
    },
    /// Print the effective configuration as JSON
    Config,
    /// Evaluate the route guard for a path
    Guard {
        path: String,
        /// Raw Cookie header, e.g. "token=abc; theme=dark"
        #[arg(long)]
        cookie: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    load_env();
    init_tracing();

    let cli = Cli::parse();
    let evaluator = StaticPolicyEvaluator::canonical();

    match cli.command {
        Commands::Check {
            role,
            resource,
            action,
        } => {
            let config = AppConfig::from_env().context("invalid configuration")?;
            let enforcer = Enforcer::from_config(&config);
            warn_unrecognised(&role, &resource, &action);
            let allowed = enforcer.evaluator().has_permission(&role, &resource, &action);
            tracing::info!(mode = %enforcer.mode(), allowed, "evaluated permission");
            println!("{}", if allowed { "allow" } else { "deny" });
        }
        Commands::Scope { role } => {
            println!("{}", evaluator.get_scope(&role));
        }
        Commands::Table { role } => {
            let roles = match role {
                Some(name) => vec![Role::parse_loose(&name)
                    .with_context(|| format!("cannot dump policy for unknown role {name:?}"))?],
                None => Role::ALL.to_vec(),
            };
            let views: Vec<RolePolicy> = roles
                .into_iter()
                .map(|role| RolePolicy::describe(evaluator.policy(), evaluator.scopes(), role))
                .collect();
            println!("{}", serde_json::to_string_pretty(&views)?);
        }
        Commands::Config => {
            let config = AppConfig::from_env().context("invalid configuration")?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Guard { path, cookie } => {
            let config = AppConfig::from_env().context("invalid route guard configuration")?;
            let decision = config.guard.check(&path, cookie.as_deref());
            println!("{}", serde_json::to_string(&decision)?);
        }
    }

    Ok(())
}

/// The decision itself stays a plain deny; this only tells the operator why,
/// and names the exact spelling when the input is a near miss.
fn warn_unrecognised(role: &str, resource: &str, action: &str) {
    if let Err(err) = role.parse::<Role>() {
        let hint = Role::parse_loose(role).map(|r| r.as_str());
        tracing::warn!(%err, ?hint, "treating as no role");
    }
    if let Err(err) = resource.parse::<Resource>() {
        let hint = Resource::parse_loose(resource).map(|r| r.as_str());
        tracing::warn!(%err, ?hint, "treating as no permission");
    }
    if let Err(err) = action.parse::<Action>() {
        let hint = Action::parse_loose(action).map(|a| a.as_str());
        tracing::warn!(%err, ?hint, "treating as not permitted");
    }
}

fn init_tracing() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr);

    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
