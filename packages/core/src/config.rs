//! Централизованная конфигурация для construct-pubkey
//!
//! Параметры по умолчанию для генерации ключей собраны здесь, чтобы реестр
//! алгоритмов не содержал хардкода. Значения выбраны для стойкости не ниже
//! 128 бит.

use std::sync::OnceLock;

/// Глобальная конфигурация (синглтон)
static GLOBAL_CONFIG: OnceLock<Config> = OnceLock::new();

/// Основная структура конфигурации
#[derive(Debug, Clone)]
pub struct Config {
    // ============================================
    // RSA
    // ============================================

    /// Размер модуля RSA, если параметры не заданы
    pub default_rsa_bits: usize,

    /// Минимально допустимый размер модуля RSA
    pub min_rsa_bits: usize,

    /// Максимально допустимый размер модуля RSA
    pub max_rsa_bits: usize,

    // ============================================
    // ЭЛЛИПТИЧЕСКИЕ КРИВЫЕ
    // ============================================

    /// Группа по умолчанию для ECDSA и ECDH
    pub default_ec_group: String,

    // ============================================
    // ДИСКРЕТНЫЙ ЛОГАРИФМ
    // ============================================

    /// Группа по умолчанию для DSA
    pub default_dl_group: String,

    // ============================================
    // ПОСТ-КВАНТОВЫЕ ПАРАМЕТРЫ
    // ============================================

    /// Режим Kyber по умолчанию
    pub default_kyber_mode: String,

    /// Режим Dilithium по умолчанию
    pub default_dilithium_mode: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_rsa_bits: 3072,
            min_rsa_bits: 1024,
            max_rsa_bits: 16384,
            default_ec_group: "secp256r1".to_string(),
            default_dl_group: "dsa/botan/2048".to_string(),
            default_kyber_mode: "Kyber-1024-r3".to_string(),
            default_dilithium_mode: "Dilithium-6x5-r3".to_string(),
        }
    }
}

impl Config {
    /// Создать конфигурацию из переменных окружения
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("PK_DEFAULT_RSA_BITS") {
            if let Ok(parsed) = val.parse() {
                config.default_rsa_bits = parsed;
            }
        }

        if let Ok(val) = std::env::var("PK_MIN_RSA_BITS") {
            if let Ok(parsed) = val.parse() {
                config.min_rsa_bits = parsed;
            }
        }

        if let Ok(val) = std::env::var("PK_MAX_RSA_BITS") {
            if let Ok(parsed) = val.parse() {
                config.max_rsa_bits = parsed;
            }
        }

        if let Ok(val) = std::env::var("PK_DEFAULT_EC_GROUP") {
            if !val.is_empty() {
                config.default_ec_group = val;
            }
        }

        if let Ok(val) = std::env::var("PK_DEFAULT_DL_GROUP") {
            if !val.is_empty() {
                config.default_dl_group = val;
            }
        }

        if let Ok(val) = std::env::var("PK_DEFAULT_KYBER_MODE") {
            if !val.is_empty() {
                config.default_kyber_mode = val;
            }
        }

        if let Ok(val) = std::env::var("PK_DEFAULT_DILITHIUM_MODE") {
            if !val.is_empty() {
                config.default_dilithium_mode = val;
            }
        }

        config
    }

    /// Получить глобальный экземпляр конфигурации
    ///
    /// Автоматически инициализирует конфигурацию со значениями по умолчанию при первом вызове
    pub fn global() -> &'static Config {
        GLOBAL_CONFIG.get_or_init(Config::default)
    }

    /// Инициализировать глобальную конфигурацию со значениями по умолчанию
    ///
    /// # Errors
    ///
    /// Возвращает ошибку, если конфигурация уже была инициализирована
    pub fn init() -> Result<(), &'static str> {
        GLOBAL_CONFIG
            .set(Self::default())
            .map_err(|_| "Config already initialized")
    }

    /// Инициализировать глобальную конфигурацию из переменных окружения
    ///
    /// # Errors
    ///
    /// Возвращает ошибку, если конфигурация уже была инициализирована
    pub fn init_from_env() -> Result<(), &'static str> {
        GLOBAL_CONFIG
            .set(Self::from_env())
            .map_err(|_| "Config already initialized")
    }

    /// Инициализировать глобальную конфигурацию с кастомным экземпляром
    ///
    /// # Errors
    ///
    /// Возвращает ошибку, если конфигурация уже была инициализирована
    pub fn init_with(config: Config) -> Result<(), &'static str> {
        GLOBAL_CONFIG
            .set(config)
            .map_err(|_| "Config already initialized")
    }

    /// Проверить, инициализирована ли глобальная конфигурация
    pub fn is_initialized() -> bool {
        GLOBAL_CONFIG.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.default_rsa_bits, 3072);
        assert_eq!(config.default_ec_group, "secp256r1");
        assert_eq!(config.default_dl_group, "dsa/botan/2048");
        assert_eq!(config.default_kyber_mode, "Kyber-1024-r3");
        assert_eq!(config.default_dilithium_mode, "Dilithium-6x5-r3");
    }

    #[test]
    fn test_rsa_bounds_contain_default() {
        let config = Config::default();
        assert!(config.min_rsa_bits >= 1024);
        assert!(config.default_rsa_bits >= 2048);
        assert!(config.min_rsa_bits <= config.default_rsa_bits);
        assert!(config.default_rsa_bits <= config.max_rsa_bits);
    }

    #[test]
    fn test_global_is_lazily_initialized() {
        let global = Config::global();
        assert!(Config::is_initialized());
        assert!(Config::init().is_err());
        assert!(!global.default_ec_group.is_empty());
    }
}
