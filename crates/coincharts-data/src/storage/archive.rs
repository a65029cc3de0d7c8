//! 원시 응답 아카이브.
//!
//! 각 fetch의 원문 본문을 감사/재현용으로 파일에 남깁니다. 파이프라인이
//! 다시 읽는 일이 없는 부수 채널이므로, 기록 실패는 로그만 남기고
//! 수집을 계속합니다.

use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

/// 원시 응답 아카이브 디렉터리.
#[derive(Debug, Clone)]
pub struct ResponseArchive {
    dir: PathBuf,
}

impl ResponseArchive {
    /// 지정한 디렉터리에 기록하는 아카이브를 생성합니다.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// 본문을 `{prefix}_{epoch}.{extension}` 파일로 기록합니다.
    pub fn store(&self, prefix: &str, extension: &str, body: &str) {
        if let Err(e) = fs::create_dir_all(&self.dir) {
            warn!(dir = %self.dir.display(), error = %e, "아카이브 디렉터리 생성 실패");
            return;
        }

        let filename = format!(
            "{}_{}.{}",
            prefix,
            chrono::Utc::now().timestamp(),
            extension
        );
        let path = self.dir.join(filename);
        match fs::write(&path, body) {
            Ok(()) => debug!(path = %path.display(), bytes = body.len(), "원시 응답 기록"),
            Err(e) => warn!(path = %path.display(), error = %e, "원시 응답 기록 실패"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_writes_prefixed_file() {
        let dir = tempfile::tempdir().unwrap();
        let archive = ResponseArchive::new(dir.path());

        archive.store("exchanges", "html", "<html>body</html>");

        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].starts_with("exchanges_"));
        assert!(entries[0].ends_with(".html"));

        let content = fs::read_to_string(dir.path().join(&entries[0])).unwrap();
        assert_eq!(content, "<html>body</html>");
    }

    #[test]
    fn test_store_failure_does_not_panic() {
        // 쓸 수 없는 경로라도 조용히 로그만 남기고 넘어가야 한다
        let archive = ResponseArchive::new("/dev/null/impossible");
        archive.store("exchanges", "html", "body");
    }
}
