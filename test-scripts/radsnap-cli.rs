use std::process::ExitCode;
use std::str::FromStr;

use radsnap::{
    render_result, Common, ConnectionConfig, HttpVerb, MainMenu, PackageRef, Packages, RadError,
    RadClientBlocking, RequestSpec, DEFAULT_CHECK_CONNECTION_METHOD, DEFAULT_MENU_DELIMITER,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct CliConfig {
    verb: HttpVerb,
    check_connection: bool,
    quote_method: bool,
    delimiter: String,
    save_first: bool,
    connection_values: Vec<String>,
}

#[derive(Debug)]
enum Command {
    Check,
    Call { method: String, args: Vec<String> },
    CallBool { method: String, args: Vec<String> },
    Packages,
    Package { package: PackageRef },
    Components { package: PackageRef },
    Install { package: PackageRef },
    Uninstall { package: PackageRef },
    IsInstalled { package: PackageRef },
    SetLoaded { package: PackageRef, loaded: bool },
    Environment,
    ExpandMacro { text: String },
    OpenFile { path: String },
    CloseFile { path: String },
    SaveFile { path: String },
    OpenProject { path: String },
    Menu,
    MenuItem { item_path: String },
    Action { name: String },
    Smoke,
    Help,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            if matches!(&err, RadError::Transport { url, .. } if !url.is_empty()) {
                eprintln!(
                    "hint: start the IDE with the DataSnap expert loaded and check host, port and URL."
                );
            }
            if let RadError::Config { reason } = &err {
                if reason.contains("failed to connect") {
                    eprintln!(
                        "hint: the server answered but `{DEFAULT_CHECK_CONNECTION_METHOD}` did not return true; pass --no-check to skip it."
                    );
                }
            }
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<(), RadError> {
    let (config, command) = parse_args(std::env::args().skip(1).collect())?;

    if matches!(command, Command::Help) {
        print_help();
        return Ok(());
    }

    let mut builder = RadClientBlocking::builder()
        .config(ConnectionConfig::from_args(config.connection_values.clone())?);
    if config.check_connection {
        builder = builder.check_connection(DEFAULT_CHECK_CONNECTION_METHOD);
    }
    let client = builder.connect()?;
    let inner = client.inner();

    match command {
        Command::Check => {
            let ok = client.check_connection(DEFAULT_CHECK_CONNECTION_METHOD)?;
            println!("connection: {}", if ok { "ok" } else { "failed" });
        }
        Command::Call { method, args } => {
            let value = client.call(request(&config, method, args))?;
            println!("{}", render_result(&value));
        }
        Command::CallBool { method, args } => {
            let value = client.call_bool(request(&config, method, args))?;
            println!("{value}");
        }
        Command::Packages => {
            let names = client.block_on(Packages::new(inner).package_names())?;
            if names.is_empty() {
                println!("no packages returned");
            } else {
                for (index, name) in names.iter().enumerate() {
                    println!("[{index}] {name}");
                }
            }
        }
        Command::Package { package } => {
            let package = client.block_on(Packages::new(inner).get(package))?;
            println!("{}", package.describe());
        }
        Command::Components { package } => {
            let package = client.block_on(Packages::new(inner).get(package))?;
            let components = client.block_on(package.components())?;
            println!("component_count={}", components.len());
            for component in components {
                println!("component={component}");
            }
        }
        Command::Install { package } => {
            let value = client.block_on(Packages::new(inner).install(package))?;
            println!("{}", render_result(&value));
        }
        Command::Uninstall { package } => {
            let value = client.block_on(Packages::new(inner).uninstall(package))?;
            println!("{}", render_result(&value));
        }
        Command::IsInstalled { package } => {
            let installed = client.block_on(Packages::new(inner).is_installed(package))?;
            println!("installed={installed}");
        }
        Command::SetLoaded { package, loaded } => {
            let mut package = client.block_on(Packages::new(inner).get(package))?;
            let value = client.block_on(package.set_loaded(loaded))?;
            println!("{}", render_result(&value));
        }
        Command::Environment => {
            let common = client.block_on(Common::load(inner))?;
            let env = common.environment();
            println!("product={}", env.product_identifier);
            println!("root_directory={}", env.root_directory);
            println!("bin_directory={}", env.bin_directory);
            println!("registry_key={}", env.base_registry_key);
            for (key, value) in &env.extra {
                println!("{key}={}", render_result(value));
            }
        }
        Command::ExpandMacro { text } => {
            let common = client.block_on(Common::load(inner))?;
            let value = client.block_on(common.expand_root_macro(&text))?;
            println!("{}", render_result(&value));
        }
        Command::OpenFile { path } => {
            let common = client.block_on(Common::load(inner))?;
            println!("{}", client.block_on(common.open_file(&path))?);
        }
        Command::CloseFile { path } => {
            let common = client.block_on(Common::load(inner))?;
            println!("{}", client.block_on(common.close_file(&path, config.save_first))?);
        }
        Command::SaveFile { path } => {
            let common = client.block_on(Common::load(inner))?;
            println!("{}", client.block_on(common.save_file(&path))?);
        }
        Command::OpenProject { path } => {
            let common = client.block_on(Common::load(inner))?;
            println!("{}", client.block_on(common.open_project(&path, true))?);
        }
        Command::Menu => {
            let menu = MainMenu::new(inner);
            println!("{}", client.block_on(menu.describe())?);
        }
        Command::MenuItem { item_path } => {
            let menu = MainMenu::new(inner);
            let done = client.block_on(menu.execute_menu_item(&item_path, &config.delimiter))?;
            println!("{done}");
        }
        Command::Action { name } => {
            let menu = MainMenu::new(inner);
            println!("{}", client.block_on(menu.execute_action(&name))?);
        }
        Command::Smoke => {
            let ok = client.check_connection(DEFAULT_CHECK_CONNECTION_METHOD)?;
            let count = client.block_on(Packages::new(inner).count())?;
            let common = client.block_on(Common::load(inner))?;
            println!(
                "smoke ok: connection={} packages={} product={}",
                ok,
                count,
                common.environment().product_identifier
            );
        }
        Command::Help => print_help(),
    }

    Ok(())
}

fn request(config: &CliConfig, method: String, args: Vec<String>) -> RequestSpec {
    let mut spec = RequestSpec::new(method).args(args).verb(config.verb);
    if !config.quote_method {
        spec = spec.unquoted();
    }
    spec
}

fn parse_args(mut args: Vec<String>) -> Result<(CliConfig, Command), RadError> {
    let mut config = default_config();

    if let Some(split) = args.iter().position(|arg| arg == "--") {
        config.connection_values = args.split_off(split + 1);
        args.pop();
    }

    let mut index = 0;
    while index < args.len() {
        match args[index].as_str() {
            "--verb" => {
                let value = args.get(index + 1).ok_or_else(|| RadError::Config {
                    reason: "missing value for --verb".to_string(),
                })?;
                config.verb = HttpVerb::from_str(value)?;
                args.drain(index..=index + 1);
            }
            "--delimiter" => {
                let value = args.get(index + 1).ok_or_else(|| RadError::Config {
                    reason: "missing value for --delimiter".to_string(),
                })?;
                config.delimiter = value.clone();
                args.drain(index..=index + 1);
            }
            "--no-check" => {
                config.check_connection = false;
                args.remove(index);
            }
            "--unquoted" => {
                config.quote_method = false;
                args.remove(index);
            }
            "--no-save" => {
                config.save_first = false;
                args.remove(index);
            }
            _ => {
                index += 1;
            }
        }
    }

    if args.is_empty() {
        return Ok((config, Command::Help));
    }

    let command_name = args.remove(0);
    let command = match command_name.as_str() {
        "help" | "--help" | "-h" => Command::Help,
        "check" => Command::Check,
        "call" => {
            let method = required(&args, 0, "call <method>")?;
            Command::Call {
                method,
                args: args[1..].to_vec(),
            }
        }
        "call-bool" => {
            let method = required(&args, 0, "call-bool <method>")?;
            Command::CallBool {
                method,
                args: args[1..].to_vec(),
            }
        }
        "packages" => Command::Packages,
        "package" => Command::Package {
            package: package_ref(&args, "package <index|name>")?,
        },
        "components" => Command::Components {
            package: package_ref(&args, "components <index|name>")?,
        },
        "install" => Command::Install {
            package: package_ref(&args, "install <index|file>")?,
        },
        "uninstall" => Command::Uninstall {
            package: package_ref(&args, "uninstall <index|file>")?,
        },
        "is-installed" => Command::IsInstalled {
            package: package_ref(&args, "is-installed <index|name>")?,
        },
        "load" => Command::SetLoaded {
            package: package_ref(&args, "load <index|name>")?,
            loaded: true,
        },
        "unload" => Command::SetLoaded {
            package: package_ref(&args, "unload <index|name>")?,
            loaded: false,
        },
        "environment" => Command::Environment,
        "expand-macro" => Command::ExpandMacro {
            text: required(&args, 0, "expand-macro <text>")?,
        },
        "open-file" => Command::OpenFile {
            path: required(&args, 0, "open-file <path>")?,
        },
        "close-file" => Command::CloseFile {
            path: required(&args, 0, "close-file <path>")?,
        },
        "save-file" => Command::SaveFile {
            path: required(&args, 0, "save-file <path>")?,
        },
        "open-project" => Command::OpenProject {
            path: required(&args, 0, "open-project <path>")?,
        },
        "menu" => Command::Menu,
        "menu-item" => Command::MenuItem {
            item_path: required(&args, 0, "menu-item <caption path>")?,
        },
        "action" => Command::Action {
            name: required(&args, 0, "action <name>")?,
        },
        "smoke" => Command::Smoke,
        other => {
            return Err(RadError::Config {
                reason: format!("unknown command `{other}`"),
            });
        }
    };

    Ok((config, command))
}

fn required(args: &[String], position: usize, usage: &str) -> Result<String, RadError> {
    args.get(position).cloned().ok_or_else(|| RadError::Config {
        reason: format!("missing argument; usage: {usage}"),
    })
}

fn package_ref(args: &[String], usage: &str) -> Result<PackageRef, RadError> {
    let value = required(args, 0, usage)?;
    PackageRef::from_str(&value).map_err(|reason| RadError::Config { reason })
}

fn default_config() -> CliConfig {
    CliConfig {
        verb: HttpVerb::Post,
        check_connection: true,
        quote_method: true,
        delimiter: DEFAULT_MENU_DELIMITER.to_string(),
        save_first: true,
        connection_values: Vec::new(),
    }
}

fn print_help() {
    println!(
        "radsnap-cli\n\nUSAGE:\n  cargo run --features cli --bin radsnap-cli -- [options] <command> [args] -- <connection values>\n\nCONNECTION VALUES:\n  settings.json                          JSON file with Hostname, Port, URL [, Login, Password]\n  hostname port URL [login password]     e.g. localhost 5555 datasnap/rest/TServerClass\n\nOPTIONS:\n  --verb <get|post>       HTTP verb for call/call-bool (default: post)\n  --unquoted              Send the method name without %22 quoting\n  --no-check              Skip the CheckConnection round-trip on connect\n  --delimiter <text>      Menu caption delimiter for menu-item (default: |)\n  --no-save               close-file without saving first\n\nCOMMANDS:\n  check                          Run CheckConnection\n  call <method> [args...]        Call any server method and print the result\n  call-bool <method> [args...]   Call a method and print its strict boolean result\n  packages                       List IDE package names\n  package <index|name>           Show package info\n  components <index|name>        List components installed by a package\n  install <index|file>           Install a package\n  uninstall <index|file>         Uninstall a package\n  is-installed <index|name>      Check whether a package is installed\n  load | unload <index|name>     Toggle the loaded state of a package\n  environment                    Show IDE environment constants\n  expand-macro <text>            Expand an IDE root macro such as $(BDS)\n  open-file | close-file | save-file <path>\n  open-project <path>            Open a project in a new project group\n  menu                           Print the main menu structure\n  menu-item <caption path>       Click a menu item, e.g. 'Tools|Options...'\n  action <name>                  Execute an IDE action by name\n  smoke                          check + package count + environment\n  help                           Show help\n"
    );
}
