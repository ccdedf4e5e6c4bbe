use std::path::Path;
use std::process::Command;

fn git(args: &[&str]) -> Option<String> {
  let output = Command::new("git").args(args).output().ok()?;
  if !output.status.success() {
    return None;
  }
  String::from_utf8(output.stdout).ok().map(|s| s.trim().to_string())
}

fn main() {
  // Rebuild when HEAD or refs move so the version string stays current.
  if let Some(git_dir) = git(&["rev-parse", "--git-dir"]) {
    let git_path = Path::new(&git_dir);
    for watched in ["HEAD", "packed-refs", "refs/heads", "refs/tags"] {
      if git_path.join(watched).exists() {
        println!("cargo:rerun-if-changed={}/{}", git_dir, watched);
      }
    }
  }

  let cargo_pkg_version = env!("CARGO_PKG_VERSION");
  let describe = match git(&["describe", "--always", "--tags", "--long", "--dirty"]) {
    Some(info) if info.contains(cargo_pkg_version) => info.replace('g', ""),
    Some(info) => format!("v{}-{}", cargo_pkg_version, info),
    None => cargo_pkg_version.to_string(),
  };

  println!("cargo:rustc-env=_GIT_INFO={}", describe);
}
