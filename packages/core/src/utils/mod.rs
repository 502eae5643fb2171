// Вспомогательные функции

/// Constant-time helpers over `subtle`
pub mod ct;

/// Разбор имён алгоритмов и параметров
pub mod parsing;
