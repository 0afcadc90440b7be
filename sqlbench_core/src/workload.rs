/// A named query of the benchmark workload.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Query {
    pub name: &'static str,
    pub sql: &'static str,
}

/// The fixed workload, in execution order.
pub const QUERIES: [Query; 6] = [
    Query {
        name: "Simple SELECT",
        sql: "SELECT * FROM users WHERE id = 5000",
    },
    Query {
        name: "COUNT",
        sql: "SELECT COUNT(*) FROM users",
    },
    Query {
        name: "AVG aggregation",
        sql: "SELECT status, AVG(balance) FROM users GROUP BY status",
    },
    Query {
        name: "LIKE search",
        sql: "SELECT * FROM users WHERE email LIKE '%500%'",
    },
    Query {
        name: "Range query",
        sql: "SELECT * FROM users WHERE balance BETWEEN 5000 AND 6000",
    },
    Query {
        name: "ORDER BY",
        sql: "SELECT * FROM users ORDER BY balance DESC LIMIT 100",
    },
];
