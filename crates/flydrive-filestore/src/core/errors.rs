//! Translation of native backend errors into the shared [`DriveError`] kinds.

use flydrive_commons::DriveError;
use std::io;

/// Native S3 error codes and the kind they map to.
const S3_NO_SUCH_BUCKET: [&str; 2] = ["NoSuchBucket", "PermanentRedirect"];
const S3_NOT_FOUND: [&str; 1] = ["NoSuchKey"];
const S3_PERMISSION: [&str; 2] = ["AllAccessDisabled", "AccessDenied"];
const S3_AUTHORIZATION: [&str; 2] = ["InvalidAccessKeyId", "SignatureDoesNotMatch"];

#[derive(Debug, PartialEq, Eq)]
enum Category {
    NotFound,
    NoSuchBucket,
    Permission,
    Authorization,
    WrongKeyPath,
    Unknown(String),
}

fn classify(err: &object_store::Error) -> Category {
    match err {
        object_store::Error::NotFound { .. } => {
            // A missing bucket is also a 404; its body names the bucket code
            let message = err.to_string();
            if S3_NO_SUCH_BUCKET.iter().any(|c| message.contains(c)) {
                Category::NoSuchBucket
            } else {
                Category::NotFound
            }
        }
        object_store::Error::InvalidPath { .. } => Category::WrongKeyPath,
        object_store::Error::PermissionDenied { .. } => Category::Permission,
        object_store::Error::Unauthenticated { .. } => Category::Authorization,
        object_store::Error::Generic { store, .. } => {
            // Generic errors embed the response body, which carries the native code
            let message = err.to_string();
            if S3_NO_SUCH_BUCKET.iter().any(|c| message.contains(c)) {
                Category::NoSuchBucket
            } else if S3_NOT_FOUND.iter().any(|c| message.contains(c)) {
                Category::NotFound
            } else if S3_PERMISSION.iter().any(|c| message.contains(c)) {
                Category::Permission
            } else if S3_AUTHORIZATION.iter().any(|c| message.contains(c)) {
                Category::Authorization
            } else {
                Category::Unknown(store.to_string())
            }
        }
        object_store::Error::AlreadyExists { .. } => Category::Unknown("AlreadyExists".into()),
        object_store::Error::Precondition { .. } => Category::Unknown("Precondition".into()),
        object_store::Error::NotModified { .. } => Category::Unknown("NotModified".into()),
        object_store::Error::NotSupported { .. } | object_store::Error::NotImplemented => {
            Category::Unknown("NotSupported".into())
        }
        _ => Category::Unknown("Unknown".into()),
    }
}

/// Map an `object_store` error raised while operating on `path`.
///
/// `bucket` is reported for `NoSuchBucket`; stores without buckets pass `None`
/// and the path is reported instead.
pub(crate) fn map_object_store_error(
    err: object_store::Error,
    path: &str,
    bucket: Option<&str>,
) -> DriveError {
    match classify(&err) {
        Category::NotFound => DriveError::file_not_found(path, err),
        Category::NoSuchBucket => DriveError::no_such_bucket(bucket.unwrap_or(path), err),
        Category::Permission => DriveError::permission_missing(path, err),
        Category::Authorization => DriveError::authorization_required(path, err),
        Category::WrongKeyPath => DriveError::wrong_key_path(path, err),
        Category::Unknown(code) => DriveError::unknown(path, code, err),
    }
}

/// Map a local filesystem error raised while operating on `path`.
pub(crate) fn map_io_error(err: io::Error, path: &str) -> DriveError {
    match err.kind() {
        io::ErrorKind::NotFound => DriveError::file_not_found(path, err),
        io::ErrorKind::PermissionDenied => DriveError::permission_missing(path, err),
        kind => {
            let code = match err.raw_os_error() {
                Some(errno) => format!("{:?} (os error {})", kind, errno),
                None => format!("{:?}", kind),
            };
            DriveError::unknown(path, code, err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flydrive_commons::ErrorKind;

    fn generic(message: &str) -> object_store::Error {
        object_store::Error::Generic {
            store: "S3",
            source: message.to_string().into(),
        }
    }

    #[test]
    fn test_not_found_maps_to_file_not_found() {
        let err = object_store::Error::NotFound {
            path: "a.txt".into(),
            source: "missing".into(),
        };
        let mapped = map_object_store_error(err, "a.txt", Some("bucket"));
        assert_eq!(mapped.kind(), ErrorKind::FileNotFound);
        assert_eq!(mapped.path(), Some("a.txt"));
    }

    #[test]
    fn test_s3_codes_in_generic_errors() {
        let mapped = map_object_store_error(
            generic("<Error><Code>NoSuchBucket</Code></Error>"),
            "a.txt",
            Some("media"),
        );
        match mapped {
            DriveError::NoSuchBucket { bucket, .. } => assert_eq!(bucket, "media"),
            other => panic!("unexpected error: {other:?}"),
        }

        let mapped = map_object_store_error(generic("AllAccessDisabled"), "a.txt", None);
        assert_eq!(mapped.kind(), ErrorKind::PermissionMissing);

        let mapped = map_object_store_error(generic("SignatureDoesNotMatch"), "a.txt", None);
        assert_eq!(mapped.kind(), ErrorKind::AuthorizationRequired);
    }

    #[test]
    fn test_missing_bucket_404_maps_to_no_such_bucket() {
        let body = "Client error with status 404 Not Found: \
                    <Error><Code>NoSuchBucket</Code></Error>";
        let err = object_store::Error::NotFound {
            path: "a.txt".into(),
            source: body.into(),
        };
        match map_object_store_error(err, "a.txt", Some("media")) {
            DriveError::NoSuchBucket { bucket, .. } => assert_eq!(bucket, "media"),
            other => panic!("unexpected error: {other:?}"),
        }

        let key_missing = object_store::Error::NotFound {
            path: "a.txt".into(),
            source: "<Error><Code>NoSuchKey</Code></Error>".into(),
        };
        let mapped = map_object_store_error(key_missing, "a.txt", Some("media"));
        assert_eq!(mapped.kind(), ErrorKind::FileNotFound);
    }

    #[test]
    fn test_unrecognized_generic_is_unknown_with_store_code() {
        let mapped = map_object_store_error(generic("connection reset"), "a.txt", None);
        match mapped {
            DriveError::UnknownException { code, path, .. } => {
                assert_eq!(code, "S3");
                assert_eq!(path, "a.txt");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_io_errors() {
        let not_found = io::Error::new(io::ErrorKind::NotFound, "nope");
        assert_eq!(map_io_error(not_found, "x").kind(), ErrorKind::FileNotFound);

        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        assert_eq!(map_io_error(denied, "x").kind(), ErrorKind::PermissionMissing);

        let other = io::Error::new(io::ErrorKind::InvalidData, "nope");
        match map_io_error(other, "x") {
            DriveError::UnknownException { code, .. } => assert_eq!(code, "InvalidData"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
