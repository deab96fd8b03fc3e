#[cfg(test)]
pub mod test {
    use std::cell::RefCell;
    use std::io::Write;
    use std::rc::Rc;

    use crate::derive::{FieldSet, Fields};
    use crate::env::EnvSnapshot;
    use crate::error::ValueError;
    use crate::value::Value;

    pub fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    pub fn vars(pairs: &[(&str, &str)]) -> EnvSnapshot {
        EnvSnapshot::new(pairs.iter().copied())
    }

    /// Caller-defined value written as `left-right`.
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct Pair {
        pub left: String,
        pub right: String,
    }

    impl Value for Pair {
        fn render(&self) -> String {
            if self.left.is_empty() && self.right.is_empty() {
                return String::new();
            }
            format!("{}-{}", self.left, self.right)
        }

        fn parse(&mut self, input: &str) -> Result<(), ValueError> {
            let (left, right) = input
                .split_once('-')
                .ok_or_else(|| ValueError::malformed(format!("expected left-right, got {input:?}")))?;
            self.left = left.to_string();
            self.right = right.to_string();
            Ok(())
        }

        fn type_hint(&self) -> String {
            "pair".into()
        }
    }

    // -- Derivation fixtures ---------------------------------------------------

    #[derive(Debug, Default, PartialEq)]
    pub struct Database {
        /// Connection string URL.
        pub url: Option<String>,
        /// Connection pool size.
        pub pool_size: usize,
    }

    impl Fields for Database {
        fn fields<'a>(&'a mut self, set: &mut FieldSet<'a>) {
            set.field("url", &mut self.url)
                .usage("connection string")
                .required();
            set.field("pool_size", &mut self.pool_size)
                .usage("connection pool size");
        }
    }

    #[derive(Debug, PartialEq)]
    pub struct Server {
        pub host: String,
        pub port: u16,
        pub debug: bool,
        pub token: String,
        pub database: Database,
        pub input: String,
        pub rest: Vec<String>,
    }

    impl Default for Server {
        fn default() -> Self {
            Self {
                host: "localhost".into(),
                port: 0,
                debug: false,
                token: String::new(),
                database: Database {
                    url: None,
                    pool_size: 5,
                },
                input: String::new(),
                rest: Vec::new(),
            }
        }
    }

    impl Fields for Server {
        fn fields<'a>(&'a mut self, set: &mut FieldSet<'a>) {
            set.field("host", &mut self.host).usage("address to bind");
            set.field("port", &mut self.port).flag(",require");
            set.field("debug", &mut self.debug).env("-");
            set.field("token", &mut self.token)
                .flag("-")
                .env("API_TOKEN");
            set.nested("database", &mut self.database).flag("db");
            set.field("input", &mut self.input).positional();
            set.field("rest", &mut self.rest).flag(",positional").env("-");
        }
    }

    /// In-memory writer that can be inspected after it was handed to a
    /// [`Config`](crate::Config).
    #[derive(Clone, Default)]
    pub struct SharedBuf(Rc<RefCell<Vec<u8>>>);

    impl SharedBuf {
        pub fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.borrow()).into_owned()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn pair_parses_and_renders() {
        let mut pair = Pair::default();
        assert_eq!(pair.render(), "");
        pair.parse("a-b").unwrap();
        assert_eq!(pair.render(), "a-b");
        assert!(pair.parse("ab").is_err());
    }

    #[test]
    fn server_defaults() {
        let server = Server::default();
        assert_eq!(server.host, "localhost");
        assert_eq!(server.database.pool_size, 5);
    }
}
