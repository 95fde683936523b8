use crate::layer_build::domain::{Accounts, Group, User};
use crate::ports::outbound::FilesystemTree;
use crate::shared::Result;
use anyhow::Context;
use std::path::Path;

const GROUP_FILE: &str = "etc/group";
const PASSWD_FILE: &str = "etc/passwd";

/// Merges configured groups and users into the account databases
///
/// Existing records are kept as they are; a configured group or user is
/// appended only when no record with the same name exists. Every configured
/// user gets a home directory owned by that user.
///
/// # Errors
/// Returns an error if an account database or a home directory cannot be
/// read or written
pub fn mutate_accounts(tree: &mut dyn FilesystemTree, accounts: &Accounts) -> Result<()> {
    if accounts.users.is_empty() && accounts.groups.is_empty() {
        return Ok(());
    }

    tree.mkdir_all(Path::new("etc"), 0o755)?;

    let group_records: Vec<String> = accounts.groups.iter().map(group_record).collect();
    merge_records(tree, GROUP_FILE, group_records)?;

    let passwd_records: Vec<String> = accounts.users.iter().map(passwd_record).collect();
    merge_records(tree, PASSWD_FILE, passwd_records)?;

    for user in &accounts.users {
        let homedir = user.homedir();
        let home = Path::new(&homedir);
        tree.mkdir_all(home, 0o755)
            .with_context(|| format!("Failed to create home directory {}", homedir))?;
        tree.chown(home, user.uid, user.gid())?;
    }

    Ok(())
}

fn group_record(group: &Group) -> String {
    format!("{}:x:{}:{}", group.groupname, group.gid, group.members.join(","))
}

fn passwd_record(user: &User) -> String {
    format!(
        "{}:x:{}:{}:Account created by layercraft:{}:{}",
        user.username,
        user.uid,
        user.gid(),
        user.homedir(),
        user.shell()
    )
}

fn record_name(record: &str) -> &str {
    record.split(':').next().unwrap_or(record)
}

fn merge_records(tree: &mut dyn FilesystemTree, file: &str, records: Vec<String>) -> Result<()> {
    let path = Path::new(file);
    let existing = if tree.exists(path) {
        let contents = tree
            .read_file(path)
            .with_context(|| format!("Failed to read {}", file))?;
        String::from_utf8_lossy(&contents).into_owned()
    } else {
        String::new()
    };

    let mut lines: Vec<String> = existing
        .lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    for record in records {
        let name = record_name(&record);
        if !lines.iter().any(|line| record_name(line) == name) {
            lines.push(record);
        }
    }

    let mut contents = lines.join("\n");
    contents.push('\n');
    tree.write_file(path, contents.as_bytes(), 0o644)
        .with_context(|| format!("Failed to write {}", file))
}
