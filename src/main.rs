use clap::Parser;
use strongroom::cli::commands;
use strongroom::cli::commands::add_entry::EntryFields;
use strongroom::cli::{output, Cli, Commands};
use strongroom::crypto::CharacterClasses;

fn main() {
    let cli = Cli::parse();
    strongroom::logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Create {
            ref name,
            ref description,
            ref encryption,
            ref storage,
        } => commands::create::execute(
            &cli,
            name,
            description,
            encryption.as_deref(),
            storage.as_deref(),
        ),
        Commands::List => commands::list::execute(&cli),
        Commands::Show { ref vault } => commands::show::execute(&cli, vault),
        Commands::AddFolder {
            ref vault,
            ref name,
            ref parent,
            ref description,
        } => commands::add_folder::execute(&cli, vault, name, parent.as_deref(), description),
        Commands::AddEntry {
            ref vault,
            ref folder,
            ref title,
            ref username,
            ref url,
            ref notes,
            ref password,
            generate,
        } => commands::add_entry::execute(
            &cli,
            vault,
            folder,
            title,
            EntryFields {
                username,
                url,
                notes,
                password: password.as_deref(),
            },
            generate,
        ),
        Commands::Attach {
            ref vault,
            ref folder,
            ref file,
            kind,
            ref entry,
            quality,
        } => commands::attach::execute(
            &cli,
            vault,
            folder,
            file,
            kind,
            entry.as_deref(),
            quality,
        ),
        Commands::Get {
            ref vault,
            ref folder,
            ref title,
            copy,
        } => commands::get::execute(&cli, vault, folder, title, copy),
        Commands::Delete { ref vault, force } => commands::delete::execute(&cli, vault, force),
        Commands::ChangePassword { ref vault } => commands::change_password::execute(&cli, vault),
        Commands::Generate {
            length,
            no_upper,
            no_lower,
            no_digits,
            no_symbols,
        } => commands::generate::execute(
            length,
            CharacterClasses {
                uppercase: !no_upper,
                lowercase: !no_lower,
                digits: !no_digits,
                symbols: !no_symbols,
            },
        ),
        Commands::Completions { shell } => commands::completions::execute(shell),
    };

    if let Err(e) = result {
        output::error(&e.to_string());
        let hint = e.remediation();
        if !hint.is_empty() {
            output::tip(hint);
        }
        std::process::exit(1);
    }
}
