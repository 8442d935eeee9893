use super::{RemoteContentWriter, WriteReceipt};
use crate::config::{Config, WriterConfig};
use crate::env::{self, Env};
use crate::error::{GitStage, PaletteError, Result};
use crate::file::{self, FileFormat};
use crate::palette::Palette;
use git2::{Cred, CredentialType, Oid, RemoteCallbacks, Repository, Signature};
use std::path::Path;

const REMOTE: &str = "origin";

/// Writes by cloning the remote into a scratch directory, committing the
/// palette file as the bot identity and pushing the branch back.
///
/// Nothing is durable until the push lands. There is no protection against a
/// concurrent writer: the last push wins.
pub struct CloneWriter {
    url: String,
    branch: String,
    depth: Option<u32>,
    token: String,
    author_name: String,
    author_email: String,
    message: String,
    path: String,
    format: FileFormat,
}

impl CloneWriter {
    pub fn from_config(config: &Config, env: &Env) -> Result<Self> {
        let WriterConfig::Clone {
            url,
            branch,
            depth,
            author_name,
            message,
        } = &config.writer
        else {
            return Err(PaletteError::Config(format!(
                "writer type is '{}', not clone",
                config.writer.kind()
            )));
        };

        let url = match url {
            Some(u) if !u.trim().is_empty() => u.clone(),
            _ => env.require(env::REPOSITORY_URL)?.to_string(),
        };

        Ok(Self {
            url,
            branch: branch.clone(),
            depth: *depth,
            token: env.require(env::GITHUB_TOKEN)?.to_string(),
            author_name: author_name.clone(),
            author_email: env.require(env::EMAIL)?.to_string(),
            message: message.clone(),
            path: config.target.path.clone(),
            format: config.target.format,
        })
    }

    fn clone_into(&self, dir: &Path) -> std::result::Result<Repository, git2::Error> {
        let mut fetch = git2::FetchOptions::new();
        fetch.remote_callbacks(token_callbacks(Some(&self.token)));
        if let Some(depth) = self.depth.filter(|d| *d > 0) {
            fetch.depth(i32::try_from(depth).unwrap_or(i32::MAX));
        }

        let branch = self.branch.clone();
        let mut builder = git2::build::RepoBuilder::new();
        builder.branch(&self.branch);
        builder.fetch_options(fetch);
        builder.remote_create(move |repo, name, url| {
            let refspec = format!("+refs/heads/{branch}:refs/remotes/{name}/{branch}");
            repo.remote_with_fetch(name, url, &refspec)
        });
        builder.clone(&self.url, dir)
    }

    fn commit(&self, repo: &Repository, tree: Oid) -> std::result::Result<Oid, git2::Error> {
        let signature = Signature::now(&self.author_name, &self.author_email)?;
        let tree = repo.find_tree(tree)?;
        let parent = repo.head()?.peel_to_commit()?;
        repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            &self.message,
            &tree,
            &[&parent],
        )
    }

    fn push(&self, repo: &Repository) -> std::result::Result<(), git2::Error> {
        let mut remote = repo.find_remote(REMOTE)?;
        let mut opts = git2::PushOptions::new();
        opts.remote_callbacks(token_callbacks(Some(&self.token)));
        let refspec = format!("refs/heads/{0}:refs/heads/{0}", self.branch);
        remote.push(&[refspec.as_str()], Some(&mut opts))
    }
}

/// Credential and push-status callbacks shared by every remote operation.
pub(crate) fn token_callbacks(token: Option<&str>) -> RemoteCallbacks<'static> {
    let token = token.map(str::to_string);
    let mut tried_token = false;

    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(move |_url, username_from_url, allowed_types| {
        if let Some(ref token) = token {
            if allowed_types.contains(CredentialType::USER_PASS_PLAINTEXT) && !tried_token {
                tried_token = true;
                return Cred::userpass_plaintext(
                    username_from_url.unwrap_or("x-access-token"),
                    token,
                );
            }
        }
        if allowed_types.contains(CredentialType::DEFAULT) {
            return Cred::default();
        }
        Err(git2::Error::from_str("remote rejected the configured credentials"))
    });
    // A ref the server refused still reports a successful push unless
    // the per-ref status is checked.
    callbacks.push_update_reference(|refname, status| match status {
        Some(msg) => Err(git2::Error::from_str(&format!(
            "remote rejected {refname}: {msg}"
        ))),
        None => Ok(()),
    });
    callbacks
}

fn stage(repo: &Repository, path: &str) -> std::result::Result<Oid, git2::Error> {
    let mut index = repo.index()?;
    index.add_path(Path::new(path))?;
    index.write()?;
    index.write_tree()
}

impl RemoteContentWriter for CloneWriter {
    fn write(&self, palette: &Palette) -> Result<WriteReceipt> {
        let target = super::checked_target(&self.path)?;
        // Removed on drop; a leftover directory is harmless.
        let workdir = tempfile::Builder::new().prefix("palette-").tempdir()?;
        tracing::info!(dir = %workdir.path().display(), url = %self.url, "cloning from remote");

        let repo = self
            .clone_into(workdir.path())
            .map_err(PaletteError::git(GitStage::Clone))?;

        let contents = file::render(palette, self.format)?;
        crate::io::atomic_write(&workdir.path().join(target), contents.as_bytes())?;

        tracing::info!(path = %self.path, "adding file");
        let tree = stage(&repo, &self.path).map_err(PaletteError::git(GitStage::Stage))?;

        tracing::info!("committing file");
        let commit = self
            .commit(&repo, tree)
            .map_err(PaletteError::git(GitStage::Commit))?;

        tracing::info!(branch = %self.branch, "pushing file upstream");
        self.push(&repo).map_err(PaletteError::git(GitStage::Push))?;

        Ok(WriteReceipt::new("clone", &self.path, Some(commit.to_string())))
    }

    fn target(&self) -> String {
        format!("{} ({})", self.url, self.branch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::bare_remote;
    use tempfile::TempDir;

    fn config(url: &str) -> Config {
        Config {
            writer: WriterConfig::Clone {
                url: Some(url.to_string()),
                branch: "master".into(),
                // local transport does not do shallow fetches
                depth: None,
                author_name: "Palette Bot".into(),
                message: "Daily automatic palette cycle".into(),
            },
            ..Config::default()
        }
    }

    fn env() -> Env {
        Env::from_pairs([(env::GITHUB_TOKEN, "tok"), (env::EMAIL, "bot@example.com")])
    }

    #[test]
    fn commits_and_pushes_one_revision() {
        let dir = TempDir::new().unwrap();
        let remote = bare_remote(&dir);
        let writer =
            CloneWriter::from_config(&config(remote.to_str().unwrap()), &env()).unwrap();

        let receipt = writer.write(&Palette::default()).unwrap();

        let bare = Repository::open_bare(&remote).unwrap();
        let head = bare
            .find_reference("refs/heads/master")
            .unwrap()
            .peel_to_commit()
            .unwrap();
        assert_eq!(receipt.commit, Some(head.id().to_string()));
        assert_eq!(head.message(), Some("Daily automatic palette cycle"));
        assert_eq!(head.author().name(), Some("Palette Bot"));
        assert_eq!(head.author().email(), Some("bot@example.com"));
        assert_eq!(head.parent_count(), 1);
        assert_eq!(
            head.parent(0).unwrap().message(),
            Some("Initial commit")
        );

        let entry = head.tree().unwrap().get_name("palette.ts").unwrap().id();
        let blob = bare.find_blob(entry).unwrap();
        let text = std::str::from_utf8(blob.content()).unwrap();
        assert_eq!(file::parse(text).unwrap(), Palette::default());
    }

    #[test]
    fn each_run_adds_a_new_commit() {
        let dir = TempDir::new().unwrap();
        let remote = bare_remote(&dir);
        let writer =
            CloneWriter::from_config(&config(remote.to_str().unwrap()), &env()).unwrap();

        let first = writer.write(&Palette::default()).unwrap();
        let second = writer.write(&Palette::default()).unwrap();
        assert_ne!(first.commit, second.commit);
    }

    #[test]
    fn clone_failure_names_the_stage() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nowhere.git");
        let writer =
            CloneWriter::from_config(&config(missing.to_str().unwrap()), &env()).unwrap();

        match writer.write(&Palette::default()) {
            Err(PaletteError::Git { stage, .. }) => assert_eq!(stage, GitStage::Clone),
            other => panic!("expected clone failure, got {other:?}"),
        }
    }

    #[test]
    fn url_falls_back_to_repository_url() {
        let mut cfg = config("");
        if let WriterConfig::Clone { url, .. } = &mut cfg.writer {
            *url = None;
        }
        let env = Env::from_pairs([
            (env::GITHUB_TOKEN, "tok"),
            (env::EMAIL, "bot@example.com"),
            (env::REPOSITORY_URL, "https://example.com/site.git"),
        ]);
        let writer = CloneWriter::from_config(&cfg, &env).unwrap();
        assert_eq!(writer.target(), "https://example.com/site.git (master)");
    }

    #[test]
    fn missing_email_is_a_config_error() {
        let env = Env::from_pairs([(env::GITHUB_TOKEN, "tok")]);
        let err = CloneWriter::from_config(&config("https://example.com/site.git"), &env)
            .err()
            .unwrap();
        assert!(matches!(err, PaletteError::MissingConfig(ref k) if k == env::EMAIL));
    }

    #[test]
    fn absolute_target_is_refused_before_cloning() {
        let dir = TempDir::new().unwrap();
        let remote = bare_remote(&dir);
        let outside = dir.path().join("outside.ts");
        let mut cfg = config(remote.to_str().unwrap());
        cfg.target.path = outside.to_str().unwrap().to_string();

        let writer = CloneWriter::from_config(&cfg, &env()).unwrap();
        let err = writer.write(&Palette::default()).unwrap_err();

        assert!(matches!(err, PaletteError::Config(_)));
        assert!(!outside.exists());
    }
}
