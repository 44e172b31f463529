//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use clap::{Args, Parser, Subcommand};

use domain::{Classification, Level, Role};

/// Administration client for the citizen-security backend
#[derive(Parser, Debug)]
#[command(name = "admin-panel")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Backend base URL
    #[arg(long, global = true, env = "API_BASE_URL")]
    pub base_url: Option<String>,

    /// Print records as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage users
    Users(UsersArgs),

    /// Browse and edit the complaint taxonomy
    Taxonomy(TaxonomyArgs),

    /// Manage requirements
    Requirements(RequirementsArgs),

    /// Validate a value without contacting the backend
    Check(CheckArgs),
}

/// Parse a role by id or by name. Citizen is not assignable from the panel.
pub fn parse_role(value: &str) -> Result<Role, String> {
    let role = match value.trim().parse::<i64>() {
        Ok(id) => Role::try_from(id).map_err(|e| e.to_string())?,
        Err(_) => Role::from_name(value).ok_or_else(|| format!("unknown role '{}'", value))?,
    };
    if !role.is_manageable() {
        return Err(format!("{} users are not managed from this panel", role));
    }
    Ok(role)
}

// ============================================================================
// Users
// ============================================================================

#[derive(Parser, Debug)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub action: UsersAction,
}

#[derive(Subcommand, Debug)]
pub enum UsersAction {
    /// List manageable users
    List,
    /// Show user counters and requirement counters
    Stats,
    /// Show one user
    Show { id: i64 },
    /// Search users on the server by name, email or RUT
    Search { query: String },
    /// Filter the loaded user list locally
    Find { query: String },
    /// Create a user
    Add(NewUserArgs),
    /// Update a user; omitted fields keep their value
    Update(UpdateUserArgs),
    /// Delete a user
    Delete {
        id: i64,
        /// Skip confirmation prompts
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
pub struct NewUserArgs {
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub paternal_last_name: String,
    #[arg(long)]
    pub maternal_last_name: String,
    /// RUT, with or without dots and dash
    #[arg(long)]
    pub rut: String,
    /// Mobile phone, e.g. 9 8765 4321
    #[arg(long)]
    pub phone: String,
    #[arg(long)]
    pub email: String,
    /// Role id or name
    #[arg(long, value_parser = parse_role)]
    pub role: Role,
    #[arg(long)]
    pub shift: Option<i64>,
    #[arg(long)]
    pub address: Option<String>,
    /// Create the account disabled
    #[arg(long)]
    pub inactive: bool,
    #[arg(long, env = "ADMIN_NEW_PASSWORD", hide_env_values = true)]
    pub password: String,
    /// Defaults to `--password`
    #[arg(long, hide_env_values = true)]
    pub confirm_password: Option<String>,
}

#[derive(Args, Debug)]
pub struct UpdateUserArgs {
    pub id: i64,
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub paternal_last_name: Option<String>,
    #[arg(long)]
    pub maternal_last_name: Option<String>,
    #[arg(long)]
    pub rut: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long, value_parser = parse_role)]
    pub role: Option<Role>,
    #[arg(long)]
    pub shift: Option<i64>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long, conflicts_with = "inactive")]
    pub active: bool,
    #[arg(long)]
    pub inactive: bool,
    /// New password; left unchanged when omitted
    #[arg(long)]
    pub password: Option<String>,
    #[arg(long)]
    pub confirm_password: Option<String>,
}

// ============================================================================
// Taxonomy
// ============================================================================

#[derive(Parser, Debug)]
pub struct TaxonomyArgs {
    #[command(subcommand)]
    pub action: TaxonomyAction,
}

#[derive(Subcommand, Debug)]
pub enum TaxonomyAction {
    /// List families
    Families,
    /// List the groups of a family
    Groups {
        #[arg(long)]
        family: i64,
    },
    /// List the subgroups of a group
    Subgroups {
        #[arg(long)]
        group: i64,
    },
    /// List the requirements of a subgroup
    Requirements {
        #[arg(long)]
        subgroup: i64,
    },
    /// Show the family, group and subgroup of a requirement
    Path { requirement_id: i64 },
    /// Create a node and show the next level under it
    Add {
        /// family, group, subgroup or requirement
        level: Level,
        name: String,
        /// Parent node id, required below family
        #[arg(long)]
        parent: Option<i64>,
        /// Requirement classification (Baja, Media, Alta)
        #[arg(long, default_value = "Media")]
        classification: Classification,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a node
    Delete {
        level: Level,
        id: i64,
        /// Skip confirmation prompts
        #[arg(short, long)]
        yes: bool,
    },
}

// ============================================================================
// Requirements
// ============================================================================

#[derive(Parser, Debug)]
pub struct RequirementsArgs {
    #[command(subcommand)]
    pub action: RequirementsAction,
}

#[derive(Subcommand, Debug)]
pub enum RequirementsAction {
    /// Search requirements by name, description, code or ancestor names
    Search { query: String },
    /// Show requirement counters
    Stats,
    /// Create a requirement under a subgroup
    Add {
        #[arg(long)]
        subgroup: i64,
        name: String,
        #[arg(long, default_value = "Media")]
        classification: Classification,
        #[arg(long)]
        description: Option<String>,
    },
    /// Update a requirement; omitted fields keep their value
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        classification: Option<Classification>,
        #[arg(long)]
        description: Option<String>,
        /// Move the requirement to another subgroup
        #[arg(long)]
        subgroup: Option<i64>,
    },
    /// Delete a requirement
    Delete {
        id: i64,
        /// Skip confirmation prompts
        #[arg(short, long)]
        yes: bool,
    },
}

// ============================================================================
// Checks
// ============================================================================

#[derive(Parser, Debug)]
pub struct CheckArgs {
    #[command(subcommand)]
    pub action: CheckAction,
}

#[derive(Subcommand, Debug)]
pub enum CheckAction {
    /// Validate and format a RUT
    Rut { value: String },
    /// Validate and format a mobile phone
    Phone { value: String },
    /// Score a password
    Password { value: String },
    /// Validate an email address
    Email { value: String },
}
